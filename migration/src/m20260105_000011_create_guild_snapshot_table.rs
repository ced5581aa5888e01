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
                    .table(GuildSnapshot::Table)
                    .if_not_exists()
                    .col(pk_auto(GuildSnapshot::Id))
                    .col(string(GuildSnapshot::GuildId))
                    .col(string(GuildSnapshot::Kind))
                    .col(string(GuildSnapshot::Reason))
                    .col(text(GuildSnapshot::Data))
                    .col(timestamp_with_time_zone(GuildSnapshot::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guild_snapshot_guild_id")
                            .from(GuildSnapshot::Table, GuildSnapshot::GuildId)
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
            .drop_table(Table::drop().table(GuildSnapshot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GuildSnapshot {
    Table,
    Id,
    GuildId,
    Kind,
    Reason,
    Data,
    CreatedAt,
}
