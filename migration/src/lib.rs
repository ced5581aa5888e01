pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_discord_guild_table;
mod m20260105_000002_create_guild_config_table;
mod m20260105_000003_create_antinuke_tables;
mod m20260105_000004_create_lockdown_table;
mod m20260105_000005_create_threat_table;
mod m20260105_000006_create_moderation_case_table;
mod m20260105_000007_create_command_usage_table;
mod m20260105_000008_create_performance_metric_table;
mod m20260105_000009_create_pending_verification_table;
mod m20260105_000010_create_activity_stat_table;
mod m20260105_000011_create_guild_snapshot_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_discord_guild_table::Migration),
            Box::new(m20260105_000002_create_guild_config_table::Migration),
            Box::new(m20260105_000003_create_antinuke_tables::Migration),
            Box::new(m20260105_000004_create_lockdown_table::Migration),
            Box::new(m20260105_000005_create_threat_table::Migration),
            Box::new(m20260105_000006_create_moderation_case_table::Migration),
            Box::new(m20260105_000007_create_command_usage_table::Migration),
            Box::new(m20260105_000008_create_performance_metric_table::Migration),
            Box::new(m20260105_000009_create_pending_verification_table::Migration),
            Box::new(m20260105_000010_create_activity_stat_table::Migration),
            Box::new(m20260105_000011_create_guild_snapshot_table::Migration),
        ]
    }
}
