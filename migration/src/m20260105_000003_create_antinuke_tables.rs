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
                    .table(AntinukeWhitelist::Table)
                    .if_not_exists()
                    .col(pk_auto(AntinukeWhitelist::Id))
                    .col(string(AntinukeWhitelist::GuildId))
                    .col(string(AntinukeWhitelist::UserId))
                    .col(string(AntinukeWhitelist::AddedBy))
                    .col(
                        timestamp_with_time_zone(AntinukeWhitelist::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_antinuke_whitelist_guild_id")
                            .from(AntinukeWhitelist::Table, AntinukeWhitelist::GuildId)
                            .to(DiscordGuild::Table, DiscordGuild::GuildId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_antinuke_whitelist_unique")
                            .col(AntinukeWhitelist::GuildId)
                            .col(AntinukeWhitelist::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AntinukeThreshold::Table)
                    .if_not_exists()
                    .col(pk_auto(AntinukeThreshold::Id))
                    .col(string(AntinukeThreshold::GuildId))
                    .col(string(AntinukeThreshold::Action))
                    .col(integer(AntinukeThreshold::MaxActions))
                    .col(integer(AntinukeThreshold::WindowSeconds))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_antinuke_threshold_guild_id")
                            .from(AntinukeThreshold::Table, AntinukeThreshold::GuildId)
                            .to(DiscordGuild::Table, DiscordGuild::GuildId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_antinuke_threshold_unique")
                            .col(AntinukeThreshold::GuildId)
                            .col(AntinukeThreshold::Action),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AntinukeThreshold::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AntinukeWhitelist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AntinukeWhitelist {
    Table,
    Id,
    GuildId,
    UserId,
    AddedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AntinukeThreshold {
    Table,
    Id,
    GuildId,
    Action,
    MaxActions,
    WindowSeconds,
}
