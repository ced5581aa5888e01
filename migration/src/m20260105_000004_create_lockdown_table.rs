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
                    .table(Lockdown::Table)
                    .if_not_exists()
                    .col(pk_auto(Lockdown::Id))
                    .col(string_uniq(Lockdown::GuildId))
                    .col(string(Lockdown::Reason))
                    .col(big_integer(Lockdown::PreviousPermissions))
                    .col(timestamp_with_time_zone(Lockdown::LockedAt))
                    .col(timestamp_with_time_zone(Lockdown::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lockdown_guild_id")
                            .from(Lockdown::Table, Lockdown::GuildId)
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
            .drop_table(Table::drop().table(Lockdown::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Lockdown {
    Table,
    Id,
    GuildId,
    Reason,
    PreviousPermissions,
    LockedAt,
    ExpiresAt,
}
