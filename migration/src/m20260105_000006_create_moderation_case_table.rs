use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModerationCase::Table)
                    .if_not_exists()
                    .col(pk_auto(ModerationCase::Id))
                    .col(string(ModerationCase::GuildId))
                    .col(string(ModerationCase::UserId))
                    .col(string(ModerationCase::ModeratorId))
                    .col(string(ModerationCase::Action))
                    .col(string_null(ModerationCase::Reason))
                    .col(timestamp_with_time_zone(ModerationCase::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_moderation_case_guild_created_at")
                    .table(ModerationCase::Table)
                    .col(ModerationCase::GuildId)
                    .col(ModerationCase::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModerationCase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ModerationCase {
    Table,
    Id,
    GuildId,
    UserId,
    ModeratorId,
    Action,
    Reason,
    CreatedAt,
}
