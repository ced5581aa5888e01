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
                    .table(PendingVerification::Table)
                    .if_not_exists()
                    .col(pk_auto(PendingVerification::Id))
                    .col(string(PendingVerification::GuildId))
                    .col(string(PendingVerification::UserId))
                    .col(string(PendingVerification::Kind))
                    .col(string(PendingVerification::Code))
                    .col(string_null(PendingVerification::VerifiedRoleId))
                    .col(timestamp_with_time_zone(PendingVerification::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_verification_guild_id")
                            .from(PendingVerification::Table, PendingVerification::GuildId)
                            .to(DiscordGuild::Table, DiscordGuild::GuildId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_pending_verification_unique")
                            .col(PendingVerification::GuildId)
                            .col(PendingVerification::UserId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingVerification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PendingVerification {
    Table,
    Id,
    GuildId,
    UserId,
    Kind,
    Code,
    VerifiedRoleId,
    CreatedAt,
}
