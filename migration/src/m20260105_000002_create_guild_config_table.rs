use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_discord_guild_table::DiscordGuild;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GuildConfig::Table)
                    .if_not_exists()
                    .col(pk_auto(GuildConfig::Id))
                    .col(string_uniq(GuildConfig::GuildId))
                    .col(string_null(GuildConfig::ModLogChannelId))
                    .col(boolean(GuildConfig::AntiNukeEnabled).default(true))
                    .col(boolean(GuildConfig::PhishingFilterEnabled).default(true))
                    .col(boolean(GuildConfig::PresenceVerificationEnabled).default(false))
                    .col(boolean(GuildConfig::StatusRolesEnabled).default(false))
                    .col(boolean(GuildConfig::ActivityAnalyticsEnabled).default(false))
                    .col(boolean(GuildConfig::AutoBackupEnabled).default(true))
                    .col(string_null(GuildConfig::GamingRoleId))
                    .col(string_null(GuildConfig::StreamingRoleId))
                    .col(string_null(GuildConfig::VerifiedRoleId))
                    .col(integer(GuildConfig::LockdownMinutes).default(30))
                    .col(string(GuildConfig::Punishment).default("strip_roles"))
                    .col(
                        timestamp_with_time_zone(GuildConfig::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guild_config_guild_id")
                            .from(GuildConfig::Table, GuildConfig::GuildId)
                            .to(DiscordGuild::Table, DiscordGuild::GuildId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuildConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GuildConfig {
    Table,
    Id,
    GuildId,
    ModLogChannelId,
    AntiNukeEnabled,
    PhishingFilterEnabled,
    PresenceVerificationEnabled,
    StatusRolesEnabled,
    ActivityAnalyticsEnabled,
    AutoBackupEnabled,
    GamingRoleId,
    StreamingRoleId,
    VerifiedRoleId,
    LockdownMinutes,
    Punishment,
    UpdatedAt,
}
