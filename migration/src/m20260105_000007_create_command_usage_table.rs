use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommandUsage::Table)
                    .if_not_exists()
                    .col(pk_auto(CommandUsage::Id))
                    .col(string(CommandUsage::Command))
                    .col(string_null(CommandUsage::GuildId))
                    .col(string(CommandUsage::UserId))
                    .col(big_integer(CommandUsage::DurationMs))
                    .col(boolean(CommandUsage::Success))
                    .col(timestamp_with_time_zone(CommandUsage::UsedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_command_usage_used_at")
                    .table(CommandUsage::Table)
                    .col(CommandUsage::UsedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommandUsage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CommandUsage {
    Table,
    Id,
    Command,
    GuildId,
    UserId,
    DurationMs,
    Success,
    UsedAt,
}
