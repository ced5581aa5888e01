use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityStat::Table)
                    .if_not_exists()
                    .col(pk_auto(ActivityStat::Id))
                    .col(string(ActivityStat::GuildId))
                    .col(integer(ActivityStat::Hour))
                    .col(string(ActivityStat::Status))
                    .col(big_integer(ActivityStat::Count).default(0))
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_activity_stat_unique")
                            .col(ActivityStat::GuildId)
                            .col(ActivityStat::Hour)
                            .col(ActivityStat::Status),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityStat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ActivityStat {
    Table,
    Id,
    GuildId,
    Hour,
    Status,
    Count,
}
