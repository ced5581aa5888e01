//! Anti-nuke detection and response.
//!
//! Audit log entries are fed into [`AntiNukeService::monitor_action`]. Each executor gets a
//! sliding window per action kind (see [`tracker`]); reaching the guild's threshold is a
//! breach. A breach records a critical threat, punishes the executor, locks the guild down
//! (see [`lockdown`]), posts to the mod log and alerts the bot operator.
//!
//! Every response step is attempted even when an earlier one fails. Failures are logged.

pub mod lockdown;
pub mod tracker;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::json;
use serenity::{
    all::{CreateEmbed, CreateEmbedFooter, EditMember, GuildId, RoleId, Timestamp, UserId},
    http::Http,
};

use crate::server::{
    data::{threat::ThreatRepository, threshold::ThresholdRepository, whitelist::WhitelistRepository},
    error::{log_bot_error, AppError},
    model::{
        antinuke::{ActionKind, Threshold},
        guild_config::{GuildConfig, Punishment},
        threat::{CreateThreatParam, Severity, THREAT_NUKE_ATTEMPT},
    },
    service::{
        alert::{Alert, AlertChannel, AlertService},
        guild_config::GuildConfigService,
        modlog::ModLogService,
    },
};

use self::{
    lockdown::{LockOutcome, LockdownService},
    tracker::{ActionTracker, Executor, Verdict},
};

/// An administrative action attributed to an executor.
#[derive(Debug, Clone)]
pub struct MonitoredAction {
    pub guild_id: u64,
    /// Guild owner, when known. Owners are never punished.
    pub owner_id: Option<u64>,
    pub executor: Executor,
    pub kind: ActionKind,
    /// Free text from the audit log (target id, reason).
    pub details: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    Bot,
    Owner,
    Whitelisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Anti-nuke is turned off for the guild.
    Disabled,
    Exempt(Exemption),
    Allowed { count: u32 },
    Breach { count: u32, threshold: Threshold },
}

pub struct AntiNukeService<'a> {
    db: &'a DatabaseConnection,
    http: &'a Http,
    configs: &'a GuildConfigService,
    tracker: &'a ActionTracker,
    alerts: &'a AlertService,
    bot_user_id: u64,
}

impl<'a> AntiNukeService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        http: &'a Http,
        configs: &'a GuildConfigService,
        tracker: &'a ActionTracker,
        alerts: &'a AlertService,
        bot_user_id: u64,
    ) -> Self {
        Self {
            db,
            http,
            configs,
            tracker,
            alerts,
            bot_user_id,
        }
    }

    /// Counts an action and responds when it breaches the guild's threshold.
    pub async fn monitor_action(&self, action: &MonitoredAction) -> Result<Assessment, AppError> {
        let config = self.configs.get(action.guild_id).await?;
        let assessment = self.assess(&config, action).await?;

        match assessment {
            Assessment::Breach { count, threshold } => {
                tracing::warn!(
                    "Anti-nuke breach in guild {}: {} by {:?} ({} within {}s)",
                    action.guild_id,
                    action.kind,
                    action.executor,
                    count,
                    threshold.window_seconds()
                );
                self.respond_to_breach(&config, action, count, threshold)
                    .await;
            }
            Assessment::Allowed { count } => tracing::debug!(
                "Guild {}: {} by {:?}, {} in window",
                action.guild_id,
                action.kind,
                action.executor,
                count
            ),
            Assessment::Disabled | Assessment::Exempt(_) => {}
        }

        Ok(assessment)
    }

    /// Decides whether the action is counted and whether it breaches.
    ///
    /// A breach clears the executor's windows so one burst triggers a single response.
    pub async fn assess(
        &self,
        config: &GuildConfig,
        action: &MonitoredAction,
    ) -> Result<Assessment, AppError> {
        if !config.anti_nuke_enabled {
            return Ok(Assessment::Disabled);
        }

        if let Executor::User(user_id) = action.executor {
            if user_id == self.bot_user_id {
                return Ok(Assessment::Exempt(Exemption::Bot));
            }
            if action.owner_id == Some(user_id) {
                return Ok(Assessment::Exempt(Exemption::Owner));
            }
            if WhitelistRepository::new(self.db)
                .contains(action.guild_id, user_id)
                .await?
            {
                return Ok(Assessment::Exempt(Exemption::Whitelisted));
            }
        }

        let threshold = ThresholdRepository::new(self.db)
            .resolve(action.guild_id, action.kind)
            .await?;

        let verdict = self.tracker.record(
            action.guild_id,
            action.executor,
            action.kind,
            action.at,
            threshold,
        );

        Ok(match verdict {
            Verdict::Allowed { count } => Assessment::Allowed { count },
            Verdict::Breach { count } => {
                self.tracker.reset(action.guild_id, action.executor);
                Assessment::Breach { count, threshold }
            }
        })
    }

    async fn respond_to_breach(
        &self,
        config: &GuildConfig,
        action: &MonitoredAction,
        count: u32,
        threshold: Threshold,
    ) {
        let reason = format!(
            "Anti-nuke: {} {} within {}s",
            count,
            action.kind.label().to_lowercase(),
            threshold.window_seconds()
        );

        if let Err(e) = ThreatRepository::new(self.db)
            .create(breach_threat(action, count, threshold))
            .await
        {
            tracing::error!("Failed to record nuke attempt in guild {}: {}", action.guild_id, e);
        }

        let punished = match action.executor {
            Executor::User(user_id) if config.punishment != Punishment::None => {
                match self
                    .punish(action.guild_id, user_id, config.punishment, &reason)
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        log_bot_error(
                            &format!("Failed to punish {} in guild {}", user_id, action.guild_id),
                            &e,
                        );
                        false
                    }
                }
            }
            _ => false,
        };

        let locked = match LockdownService::new(self.db, self.http)
            .lock(action.guild_id, &reason, config.lockdown_minutes)
            .await
        {
            Ok(LockOutcome::Locked(_)) => true,
            Ok(LockOutcome::AlreadyLocked(_)) => false,
            Err(e) => {
                log_bot_error(
                    &format!("Failed to lock down guild {}", action.guild_id),
                    &e,
                );
                false
            }
        };

        let embed = breach_embed(action, count, threshold, config.punishment, punished, locked);
        if let Err(e) = ModLogService::new(self.http).post(config, embed).await {
            log_bot_error(
                &format!("Failed to post breach to mod log of guild {}", action.guild_id),
                &e,
            );
        }

        let alert = Alert::new(AlertChannel::Security, "🚨 Nuke Attempt Detected")
            .description(format!(
                "**{}** reached the anti-nuke threshold in guild `{}`.",
                action.kind.label(),
                action.guild_id
            ))
            .field("Executor", action.executor.mention(), true)
            .field(
                "Actions",
                format!("{} in {}s", count, threshold.window_seconds()),
                true,
            )
            .field(
                "Response",
                response_summary(config.punishment, punished, locked),
                false,
            )
            .field("Details", non_empty(&action.details), false);
        self.alerts.send(&alert).await;
    }

    async fn punish(
        &self,
        guild_id: u64,
        user_id: u64,
        punishment: Punishment,
        reason: &str,
    ) -> Result<(), AppError> {
        let guild = GuildId::new(guild_id);
        let user = UserId::new(user_id);

        match punishment {
            Punishment::None => {}
            Punishment::StripRoles => {
                let managed: HashSet<RoleId> = self
                    .http
                    .get_guild_roles(guild)
                    .await?
                    .into_iter()
                    .filter(|role| role.managed)
                    .map(|role| role.id)
                    .collect();
                let member = guild.member(self.http, user).await?;

                guild
                    .edit_member(
                        self.http,
                        user,
                        EditMember::new()
                            .roles(roles_to_keep(&member.roles, &managed))
                            .audit_log_reason(reason),
                    )
                    .await?;
            }
            Punishment::Kick => guild.kick_with_reason(self.http, user, reason).await?,
            Punishment::Ban => guild.ban_with_reason(self.http, user, 0, reason).await?,
        }

        tracing::info!("Applied {} to {} in guild {}", punishment, user_id, guild_id);

        Ok(())
    }
}

/// Managed roles (bot and integration roles) cannot be removed, so they are kept.
pub fn roles_to_keep(member_roles: &[RoleId], managed: &HashSet<RoleId>) -> Vec<RoleId> {
    member_roles
        .iter()
        .filter(|role| managed.contains(role))
        .copied()
        .collect()
}

pub fn breach_threat(action: &MonitoredAction, count: u32, threshold: Threshold) -> CreateThreatParam {
    CreateThreatParam {
        guild_id: action.guild_id,
        user_id: action.executor.user_id(),
        threat_type: THREAT_NUKE_ATTEMPT.to_string(),
        severity: Severity::Critical,
        details: json!({
            "action": action.kind.as_str(),
            "count": count,
            "limit": threshold.limit,
            "window_seconds": threshold.window_seconds(),
            "details": action.details,
        }),
    }
}

fn response_summary(punishment: Punishment, punished: bool, locked: bool) -> String {
    let punishment = match (punishment, punished) {
        (Punishment::None, _) => "no punishment configured".to_string(),
        (p, true) => format!("{} applied", p),
        (p, false) => format!("{} failed", p),
    };
    let lockdown = if locked {
        "guild locked down"
    } else {
        "no new lockdown"
    };

    format!("{}, {}", punishment, lockdown)
}

fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "None"
    } else {
        text
    }
}

fn breach_embed(
    action: &MonitoredAction,
    count: u32,
    threshold: Threshold,
    punishment: Punishment,
    punished: bool,
    locked: bool,
) -> CreateEmbed {
    CreateEmbed::new()
        .title("🚨 Anti-Nuke Triggered")
        .description(format!(
            "{} exceeded the limit of {} within {}s.",
            action.kind.label(),
            threshold.limit,
            threshold.window_seconds()
        ))
        .color(0xff0000)
        .field("Executor", action.executor.mention(), true)
        .field("Actions", count.to_string(), true)
        .field(
            "Response",
            response_summary(punishment, punished, locked),
            false,
        )
        .footer(CreateEmbedFooter::new("Nexus Anti-Nuke Protection"))
        .timestamp(Timestamp::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::performance::PerformanceMonitor;
    use chrono::TimeDelta;
    use test_utils::{builder::TestBuilder, factory};

    const BOT_ID: u64 = 999;

    struct Fixture {
        http: Http,
        configs: GuildConfigService,
        tracker: ActionTracker,
        alerts: AlertService,
    }

    impl Fixture {
        fn new(db: &DatabaseConnection) -> Self {
            Self {
                http: Http::new(""),
                configs: GuildConfigService::new(db.clone(), PerformanceMonitor::new()),
                tracker: ActionTracker::new(),
                alerts: AlertService::new(reqwest::Client::new(), None, None),
            }
        }

        fn service<'a>(&'a self, db: &'a DatabaseConnection) -> AntiNukeService<'a> {
            AntiNukeService::new(db, &self.http, &self.configs, &self.tracker, &self.alerts, BOT_ID)
        }
    }

    fn action(guild_id: u64, executor: Executor, kind: ActionKind, offset: i64) -> MonitoredAction {
        MonitoredAction {
            guild_id,
            owner_id: Some(1),
            executor,
            kind,
            details: String::new(),
            at: Utc::now() + TimeDelta::milliseconds(offset),
        }
    }

    /// Tests the exemptions for the bot itself, the owner and whitelisted users.
    ///
    /// Expected: Exempt with the matching reason, nothing tracked
    #[tokio::test]
    async fn exempts_bot_owner_and_whitelist() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        factory::create_whitelist_entry(db, &guild.guild_id, "555").await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        let fixture = Fixture::new(db);
        let service = fixture.service(db);
        let config = GuildConfig::default_for(guild_id);

        let kind = ActionKind::ChannelDelete;
        assert_eq!(
            service.assess(&config, &action(guild_id, Executor::User(BOT_ID), kind, 0)).await?,
            Assessment::Exempt(Exemption::Bot)
        );
        assert_eq!(
            service.assess(&config, &action(guild_id, Executor::User(1), kind, 0)).await?,
            Assessment::Exempt(Exemption::Owner)
        );
        assert_eq!(
            service.assess(&config, &action(guild_id, Executor::User(555), kind, 0)).await?,
            Assessment::Exempt(Exemption::Whitelisted)
        );
        assert_eq!(fixture.tracker.tracked_executors(), 0);

        Ok(())
    }

    /// Tests that nothing is counted while anti-nuke is disabled.
    ///
    /// Expected: Disabled
    #[tokio::test]
    async fn disabled_guild_is_not_tracked() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let fixture = Fixture::new(db);

        let mut config = GuildConfig::default_for(5);
        config.anti_nuke_enabled = false;

        let assessment = fixture
            .service(db)
            .assess(&config, &action(5, Executor::User(7), ActionKind::MemberBan, 0))
            .await?;

        assert_eq!(assessment, Assessment::Disabled);
        assert_eq!(fixture.tracker.tracked_executors(), 0);

        Ok(())
    }

    /// Tests the default channel delete threshold of 3 within 10 seconds.
    ///
    /// Expected: third delete breaches, the window restarts afterwards
    #[tokio::test]
    async fn breaches_on_default_threshold_and_resets() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let fixture = Fixture::new(db);
        let service = fixture.service(db);
        let config = GuildConfig::default_for(5);
        let executor = Executor::User(7);

        let mut results = Vec::new();
        for i in 0..4 {
            results.push(
                service
                    .assess(&config, &action(5, executor, ActionKind::ChannelDelete, i))
                    .await?,
            );
        }

        assert_eq!(results[0], Assessment::Allowed { count: 1 });
        assert_eq!(results[1], Assessment::Allowed { count: 2 });
        assert!(matches!(results[2], Assessment::Breach { count: 3, .. }));
        assert_eq!(results[3], Assessment::Allowed { count: 1 });

        Ok(())
    }

    /// Tests that a stored per-guild threshold overrides the default.
    ///
    /// Expected: the second ban breaches with a limit of 2
    #[tokio::test]
    async fn uses_guild_threshold_override() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();
        ThresholdRepository::new(db)
            .set(guild_id, ActionKind::MemberBan, Threshold::new(2, 30))
            .await?;

        let fixture = Fixture::new(db);
        let service = fixture.service(db);
        let config = GuildConfig::default_for(guild_id);

        service
            .assess(&config, &action(guild_id, Executor::Unknown, ActionKind::MemberBan, 0))
            .await?;
        let second = service
            .assess(&config, &action(guild_id, Executor::Unknown, ActionKind::MemberBan, 1))
            .await?;

        assert_eq!(
            second,
            Assessment::Breach {
                count: 2,
                threshold: Threshold::new(2, 30)
            }
        );

        Ok(())
    }

    #[test]
    fn keeps_only_managed_roles() {
        let managed: HashSet<RoleId> = [RoleId::new(2)].into_iter().collect();
        let member_roles = [RoleId::new(1), RoleId::new(2), RoleId::new(3)];

        assert_eq!(roles_to_keep(&member_roles, &managed), vec![RoleId::new(2)]);
    }

    #[test]
    fn breach_threat_is_critical_nuke_attempt() {
        let action = action(5, Executor::Unknown, ActionKind::RoleDelete, 0);

        let param = breach_threat(&action, 3, Threshold::new(3, 10));

        assert_eq!(param.threat_type, THREAT_NUKE_ATTEMPT);
        assert_eq!(param.severity, Severity::Critical);
        assert_eq!(param.user_id, None);
        assert_eq!(param.details["action"], "role_delete");
        assert_eq!(param.details["window_seconds"], 10);
    }

    #[test]
    fn summarises_response() {
        assert_eq!(
            response_summary(Punishment::Ban, true, true),
            "ban applied, guild locked down"
        );
        assert_eq!(
            response_summary(Punishment::None, false, false),
            "no punishment configured, no new lockdown"
        );
    }
}
