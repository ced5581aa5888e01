use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Threat::Table)
                    .if_not_exists()
                    .col(pk_auto(Threat::Id))
                    .col(string(Threat::GuildId))
                    .col(string_null(Threat::UserId))
                    .col(string(Threat::ThreatType))
                    .col(string(Threat::Severity))
                    .col(text(Threat::Details))
                    .col(timestamp_with_time_zone(Threat::ReportedAt))
                    .to_owned(),
            )
            .await?;

        // Dashboards always filter by guild and time range
        manager
            .create_index(
                Index::create()
                    .name("idx_threat_guild_reported_at")
                    .table(Threat::Table)
                    .col(Threat::GuildId)
                    .col(Threat::ReportedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_threat_guild_reported_at")
                    .table(Threat::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Threat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Threat {
    Table,
    Id,
    GuildId,
    UserId,
    ThreatType,
    Severity,
    Details,
    ReportedAt,
}
