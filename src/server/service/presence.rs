//! Presence driven features: presence verification, status roles and activity analytics.
//!
//! Each feature is gated by its own guild config flag and fails independently.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Timelike, Utc};
use dashmap::DashMap;
use rand::{distr::Alphanumeric, Rng};
use sea_orm::DatabaseConnection;
use serenity::{
    all::{Activity, ActivityType, Guild, GuildId, OnlineStatus, RoleId, UserId},
    http::Http,
};

use crate::server::{
    data::{activity_stat::ActivityStatRepository, verification::VerificationRepository},
    error::{log_bot_error, AppError},
    model::{
        guild_config::GuildConfig,
        verification::{PendingVerification, VerificationKind},
    },
};

const CODE_PREFIX: &str = "NEXUS-";
const CODE_LENGTH: usize = 6;

/// A fresh presence verification code, e.g. `NEXUS-4KQ7ZD`.
pub fn generate_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect();

    format!("{}{}", CODE_PREFIX, suffix.to_uppercase())
}

/// Text of the member's custom status, if any.
pub fn custom_status(activities: &[Activity]) -> Option<&str> {
    activities
        .iter()
        .find(|a| a.kind == ActivityType::Custom)
        .and_then(|a| a.state.as_deref())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityFlags {
    pub gaming: bool,
    pub streaming: bool,
}

impl ActivityFlags {
    pub fn from_activities(activities: &[Activity]) -> Self {
        Self {
            gaming: activities.iter().any(|a| a.kind == ActivityType::Playing),
            streaming: activities.iter().any(|a| a.kind == ActivityType::Streaming),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Add(u64),
    Remove(u64),
}

/// Roles to add or remove when a member starts or stops gaming/streaming.
pub fn status_role_changes(
    previous: ActivityFlags,
    current: ActivityFlags,
    gaming_role: Option<u64>,
    streaming_role: Option<u64>,
) -> Vec<RoleChange> {
    [
        (previous.gaming, current.gaming, gaming_role),
        (previous.streaming, current.streaming, streaming_role),
    ]
    .into_iter()
    .filter_map(|(was, is, role)| match (was, is, role) {
        (false, true, Some(role)) => Some(RoleChange::Add(role)),
        (true, false, Some(role)) => Some(RoleChange::Remove(role)),
        _ => None,
    })
    .collect()
}

/// Role positions taken from the cache.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    bot_top_position: Option<u16>,
    positions: HashMap<u64, u16>,
}

impl RoleHierarchy {
    pub fn from_guild(guild: &Guild, bot_user_id: u64) -> Self {
        let positions: HashMap<u64, u16> = guild
            .roles
            .values()
            .map(|role| (role.id.get(), role.position))
            .collect();

        let bot_top_position = guild
            .members
            .get(&UserId::new(bot_user_id))
            .and_then(|member| {
                member
                    .roles
                    .iter()
                    .filter_map(|id| positions.get(&id.get()).copied())
                    .max()
            });

        Self {
            bot_top_position,
            positions,
        }
    }

    pub fn exists(&self, role_id: u64) -> bool {
        self.positions.contains_key(&role_id)
    }

    /// Whether the bot's highest role is above `role_id`.
    pub fn can_assign(&self, role_id: u64) -> bool {
        match (self.bot_top_position, self.positions.get(&role_id)) {
            (Some(bot), Some(role)) => bot > *role,
            _ => false,
        }
    }
}

/// Activity flags seen last per (guild, member).
///
/// Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct PresenceTracker {
    flags: Arc<DashMap<(u64, u64), ActivityFlags>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `current` and returns the previously seen flags.
    pub fn transition(&self, guild_id: u64, user_id: u64, current: ActivityFlags) -> ActivityFlags {
        self.flags
            .insert((guild_id, user_id), current)
            .unwrap_or_default()
    }

    pub fn forget_guild(&self, guild_id: u64) {
        self.flags.retain(|(guild, _), _| *guild != guild_id);
    }
}

/// A presence update reduced to what the features need.
#[derive(Debug, Clone)]
pub struct PresenceChange<'p> {
    pub guild_id: u64,
    pub user_id: u64,
    pub status: OnlineStatus,
    pub activities: &'p [Activity],
    pub at: DateTime<Utc>,
}

pub struct PresenceService<'a> {
    db: &'a DatabaseConnection,
    http: &'a Http,
    tracker: &'a PresenceTracker,
}

impl<'a> PresenceService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: &'a Http, tracker: &'a PresenceTracker) -> Self {
        Self { db, http, tracker }
    }

    /// Runs every feature the guild has enabled.
    pub async fn handle(
        &self,
        config: &GuildConfig,
        change: &PresenceChange<'_>,
        hierarchy: &RoleHierarchy,
    ) {
        if config.presence_verification_enabled {
            if let Err(e) = self.verify(change, hierarchy).await {
                log_bot_error("Presence verification failed", &e);
            }
        }

        if config.status_roles_enabled {
            if let Err(e) = self.apply_status_roles(config, change, hierarchy).await {
                log_bot_error("Status role update failed", &e);
            }
        }

        if config.activity_analytics_enabled {
            if let Err(e) = self.record_activity(change).await {
                tracing::debug!("Failed to record activity for guild {}: {}", change.guild_id, e);
            }
        }
    }

    /// Completes a pending presence verification whose code is in the custom status.
    ///
    /// The verified role is granted only when the bot can manage it.
    pub async fn verify(
        &self,
        change: &PresenceChange<'_>,
        hierarchy: &RoleHierarchy,
    ) -> Result<Option<PendingVerification>, AppError> {
        let repo = VerificationRepository::new(self.db);

        let Some(pending) = repo.find(change.guild_id, change.user_id).await? else {
            return Ok(None);
        };
        if pending.kind != VerificationKind::Presence {
            return Ok(None);
        }

        let status = custom_status(change.activities).unwrap_or_default();
        if !status.contains(&pending.code) {
            return Ok(None);
        }

        // Consumed only after a successful grant; a failed grant retries on the next update.
        if let Some(role_id) = pending.verified_role_id {
            if hierarchy.can_assign(role_id) {
                self.http
                    .add_member_role(
                        GuildId::new(change.guild_id),
                        UserId::new(change.user_id),
                        RoleId::new(role_id),
                        Some("Presence verification completed"),
                    )
                    .await?;
            } else {
                tracing::debug!(
                    "Cannot grant verified role {} in guild {}: role missing or above the bot",
                    role_id,
                    change.guild_id
                );
            }
        }

        repo.delete(change.guild_id, change.user_id).await?;
        tracing::info!(
            "User {} verified via presence in guild {}",
            change.user_id,
            change.guild_id
        );

        Ok(Some(pending))
    }

    /// Adds or removes the gaming/streaming roles on activity transitions.
    pub async fn apply_status_roles(
        &self,
        config: &GuildConfig,
        change: &PresenceChange<'_>,
        hierarchy: &RoleHierarchy,
    ) -> Result<Vec<RoleChange>, AppError> {
        let current = ActivityFlags::from_activities(change.activities);
        let previous = self
            .tracker
            .transition(change.guild_id, change.user_id, current);

        let changes: Vec<RoleChange> = status_role_changes(
            previous,
            current,
            config.gaming_role_id,
            config.streaming_role_id,
        )
        .into_iter()
        .filter(|c| match c {
            RoleChange::Add(role) | RoleChange::Remove(role) => hierarchy.exists(*role),
        })
        .collect();

        let guild = GuildId::new(change.guild_id);
        let user = UserId::new(change.user_id);
        for role_change in &changes {
            match *role_change {
                RoleChange::Add(role) => {
                    self.http
                        .add_member_role(guild, user, RoleId::new(role), Some("Status role"))
                        .await?
                }
                RoleChange::Remove(role) => {
                    self.http
                        .remove_member_role(guild, user, RoleId::new(role), Some("Status role"))
                        .await?
                }
            }
        }

        Ok(changes)
    }

    /// Counts the new status in the guild's hourly activity histogram.
    pub async fn record_activity(&self, change: &PresenceChange<'_>) -> Result<(), AppError> {
        ActivityStatRepository::new(self.db)
            .increment(change.guild_id, change.at.hour(), change.status.name())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        builder::TestBuilder,
        factory,
        serenity::{create_test_activity, create_test_guild_with, role_json},
    };

    fn change<'p>(guild_id: u64, user_id: u64, activities: &'p [Activity]) -> PresenceChange<'p> {
        PresenceChange {
            guild_id,
            user_id,
            status: OnlineStatus::Online,
            activities,
            at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn codes_have_prefix_and_length() {
        let code = generate_code();

        assert!(code.starts_with(CODE_PREFIX));
        assert_eq!(code.len(), CODE_PREFIX.len() + CODE_LENGTH);
        assert_ne!(code, generate_code());
    }

    #[test]
    fn reads_custom_status_only() {
        let activities = vec![
            create_test_activity(0, "Minecraft", None),
            create_test_activity(4, "Custom Status", Some("verifying NEXUS-ABC123")),
        ];

        assert_eq!(custom_status(&activities), Some("verifying NEXUS-ABC123"));
        assert_eq!(custom_status(&activities[..1]), None);
    }

    #[test]
    fn role_changes_follow_transitions() {
        let idle = ActivityFlags::default();
        let gaming = ActivityFlags {
            gaming: true,
            streaming: false,
        };

        assert_eq!(
            status_role_changes(idle, gaming, Some(1), Some(2)),
            vec![RoleChange::Add(1)]
        );
        assert_eq!(
            status_role_changes(gaming, idle, Some(1), Some(2)),
            vec![RoleChange::Remove(1)]
        );
        assert!(status_role_changes(gaming, gaming, Some(1), Some(2)).is_empty());
        assert!(status_role_changes(idle, gaming, None, Some(2)).is_empty());
    }

    #[test]
    fn tracker_remembers_previous_flags() {
        let tracker = PresenceTracker::new();
        let streaming = ActivityFlags {
            gaming: false,
            streaming: true,
        };

        assert_eq!(tracker.transition(1, 2, streaming), ActivityFlags::default());
        assert_eq!(tracker.transition(1, 2, ActivityFlags::default()), streaming);
    }

    #[test]
    fn hierarchy_requires_bot_above_role() {
        let guild = create_test_guild_with(
            1,
            "Guild",
            vec![role_json(10, "Verified", 0, 2, 0), role_json(11, "Staff", 0, 8, 0)],
            &[],
        );
        let mut hierarchy = RoleHierarchy::from_guild(&guild, 99);
        assert!(!hierarchy.can_assign(10));

        hierarchy.bot_top_position = Some(5);
        assert!(hierarchy.can_assign(10));
        assert!(!hierarchy.can_assign(11));
        assert!(!hierarchy.can_assign(12));
    }

    /// Tests that a matching custom status completes the verification.
    ///
    /// Expected: pending row removed, no role granted without one configured
    #[tokio::test]
    async fn completes_verification_on_matching_status() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        let repo = VerificationRepository::new(db);
        repo.upsert_pending(guild_id, 7, VerificationKind::Presence, "NEXUS-QQQ111", None)
            .await?;

        let http = Http::new("");
        let tracker = PresenceTracker::new();
        let service = PresenceService::new(db, &http, &tracker);
        let hierarchy = RoleHierarchy::default();

        let wrong = [create_test_activity(4, "Custom Status", Some("hello"))];
        assert!(service.verify(&change(guild_id, 7, &wrong), &hierarchy).await?.is_none());

        let right = [create_test_activity(4, "Custom Status", Some("code NEXUS-QQQ111"))];
        let verified = service.verify(&change(guild_id, 7, &right), &hierarchy).await?;

        assert_eq!(verified.map(|v| v.code), Some("NEXUS-QQQ111".to_string()));
        assert!(repo.find(guild_id, 7).await?.is_none());

        Ok(())
    }

    /// Tests a verification whose role grant fails.
    ///
    /// Expected: the error is returned and the pending code stays usable
    #[tokio::test]
    async fn keeps_pending_code_when_grant_fails() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        let repo = VerificationRepository::new(db);
        repo.upsert_pending(guild_id, 7, VerificationKind::Presence, "NEXUS-RRR222", Some(10))
            .await?;

        // No token, so Discord rejects the grant.
        let http = Http::new("");
        let tracker = PresenceTracker::new();
        let service = PresenceService::new(db, &http, &tracker);
        let role_guild = create_test_guild_with(
            guild_id,
            "Guild",
            vec![role_json(10, "Verified", 0, 2, 0)],
            &[],
        );
        let mut hierarchy = RoleHierarchy::from_guild(&role_guild, 99);
        hierarchy.bot_top_position = Some(5);

        let status = [create_test_activity(4, "Custom Status", Some("NEXUS-RRR222"))];
        let result = service.verify(&change(guild_id, 7, &status), &hierarchy).await;

        assert!(result.is_err());
        assert!(repo.find(guild_id, 7).await?.is_some());

        Ok(())
    }

    /// Tests that presence updates are counted per hour and status.
    ///
    /// Expected: two observations in the same bucket
    #[tokio::test]
    async fn records_hourly_activity() -> Result<(), AppError> {
        let test = TestBuilder::new().with_log_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let http = Http::new("");
        let tracker = PresenceTracker::new();
        let service = PresenceService::new(db, &http, &tracker);

        service.record_activity(&change(3, 1, &[])).await?;
        service.record_activity(&change(3, 2, &[])).await?;

        let stats = ActivityStatRepository::new(db).get_by_guild(3).await?;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].status, "online");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].hour, 22);

        Ok(())
    }
}
