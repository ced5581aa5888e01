//! Guild structure backups, taken on demand and automatically every 24 hours.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serenity::all::Guild;

use crate::server::{
    data::snapshot::SnapshotRepository,
    error::AppError,
    model::{
        guild_config::Feature,
        snapshot::{GuildSnapshot, SnapshotData},
    },
    service::guild_config::GuildConfigService,
};

pub const SNAPSHOT_KIND_FULL: &str = "full";
pub const BACKUP_INTERVAL_HOURS: i64 = 24;

/// Why an automatic backup is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupDue {
    Initial,
    Scheduled { hours_since_last: i64 },
}

impl BackupDue {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Initial => "Automatic backup - initial snapshot",
            Self::Scheduled { .. } => "Automatic scheduled backup",
        }
    }
}

/// A backup is due when none exists or the newest is at least 24 hours old.
pub fn backup_due(latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<BackupDue> {
    let Some(latest) = latest else {
        return Some(BackupDue::Initial);
    };

    let age = now - latest;
    if age >= Duration::hours(BACKUP_INTERVAL_HOURS) {
        Some(BackupDue::Scheduled {
            hours_since_last: age.num_hours(),
        })
    } else {
        None
    }
}

pub struct BackupService<'a> {
    db: &'a DatabaseConnection,
    configs: &'a GuildConfigService,
}

impl<'a> BackupService<'a> {
    pub fn new(db: &'a DatabaseConnection, configs: &'a GuildConfigService) -> Self {
        Self { db, configs }
    }

    pub async fn create(&self, guild: &Guild, reason: &str) -> Result<GuildSnapshot, AppError> {
        let data = SnapshotData::from_guild(guild);
        let snapshot = SnapshotRepository::new(self.db)
            .create(guild.id.get(), SNAPSHOT_KIND_FULL, reason, &data)
            .await?;

        tracing::info!(
            "Backup of {} ({}) created: {} roles, {} channels",
            guild.name,
            guild.id,
            data.roles.len(),
            data.channels.len()
        );

        Ok(snapshot)
    }

    pub async fn list(&self, guild_id: u64, limit: u64) -> Result<Vec<GuildSnapshot>, AppError> {
        Ok(SnapshotRepository::new(self.db)
            .get_by_guild(guild_id, limit)
            .await?)
    }

    /// Creates a snapshot when auto-backup is enabled and one is due.
    pub async fn backup_if_due(
        &self,
        guild: &Guild,
        now: DateTime<Utc>,
    ) -> Result<Option<GuildSnapshot>, AppError> {
        let config = self.configs.get(guild.id.get()).await?;
        if !config.feature_enabled(Feature::AutoBackup) {
            return Ok(None);
        }

        let latest = SnapshotRepository::new(self.db)
            .get_latest(guild.id.get())
            .await?
            .map(|s| s.created_at);

        let Some(due) = backup_due(latest, now) else {
            return Ok(None);
        };

        if let BackupDue::Scheduled { hours_since_last } = due {
            tracing::info!(
                "Scheduled backup for {} (last backup {} hours ago)",
                guild.name,
                hours_since_last
            );
        }

        self.create(guild, due.reason()).await.map(Some)
    }

    /// Runs `backup_if_due` for each guild; a failure only skips that guild.
    pub async fn run(&self, guilds: &[Guild], now: DateTime<Utc>) -> usize {
        let mut created = 0;

        for guild in guilds {
            match self.backup_if_due(guild, now).await {
                Ok(Some(_)) => created += 1,
                Ok(None) => {}
                Err(e) => tracing::error!("Failed to back up guild {}: {}", guild.id, e),
            }
        }

        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{
        model::guild_config::ConfigUpdate, service::performance::PerformanceMonitor,
    };
    use test_utils::{
        builder::TestBuilder,
        factory,
        serenity::{create_test_guild_with, role_json},
    };

    #[test]
    fn backup_due_after_a_day() {
        let now = Utc::now();

        assert_eq!(backup_due(None, now), Some(BackupDue::Initial));
        assert_eq!(backup_due(Some(now - Duration::hours(23)), now), None);
        assert_eq!(
            backup_due(Some(now - Duration::hours(30)), now),
            Some(BackupDue::Scheduled {
                hours_since_last: 30
            })
        );
    }

    /// Tests the automatic backup cycle for one guild.
    ///
    /// Expected: initial snapshot created, second run within 24h does nothing
    #[tokio::test]
    async fn creates_initial_backup_once() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let row = factory::create_guild(db).await?;
        let guild_id: u64 = row.guild_id.parse().unwrap();
        let guild = create_test_guild_with(
            guild_id,
            &row.name,
            vec![role_json(2, "Member", 0, 1, 0)],
            &[(10, "general", 0, None)],
        );
        let configs = GuildConfigService::new(db.clone(), PerformanceMonitor::new());
        let service = BackupService::new(db, &configs);

        let first = service.run(std::slice::from_ref(&guild), Utc::now()).await;
        let second = service.run(std::slice::from_ref(&guild), Utc::now()).await;

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        let snapshots = service.list(guild_id, 10).await?;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].reason, BackupDue::Initial.reason());
        assert_eq!(snapshots[0].data.channels[0].name, "general");

        Ok(())
    }

    #[tokio::test]
    async fn skips_guilds_with_auto_backup_disabled() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let row = factory::create_guild(db).await?;
        let guild_id: u64 = row.guild_id.parse().unwrap();
        let guild = create_test_guild_with(guild_id, &row.name, Vec::new(), &[]);
        let configs = GuildConfigService::new(db.clone(), PerformanceMonitor::new());
        configs
            .update(guild_id, ConfigUpdate::Feature(Feature::AutoBackup, false))
            .await?;

        let created = BackupService::new(db, &configs)
            .backup_if_due(&guild, Utc::now())
            .await?;

        assert!(created.is_none());

        Ok(())
    }
}
