use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PerformanceMetric::Table)
                    .if_not_exists()
                    .col(pk_auto(PerformanceMetric::Id))
                    .col(double(PerformanceMetric::AvgCommandMs))
                    .col(double(PerformanceMetric::AvgQueryMs))
                    .col(double(PerformanceMetric::MemoryMb))
                    .col(double(PerformanceMetric::CacheHitRate))
                    .col(integer(PerformanceMetric::HealthScore))
                    .col(big_integer(PerformanceMetric::CommandCount))
                    .col(integer(PerformanceMetric::AlertCount))
                    .col(timestamp_with_time_zone(PerformanceMetric::RecordedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PerformanceMetric::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PerformanceMetric {
    Table,
    Id,
    AvgCommandMs,
    AvgQueryMs,
    MemoryMb,
    CacheHitRate,
    HealthScore,
    CommandCount,
    AlertCount,
    RecordedAt,
}
