use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "performance_metric")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub avg_command_ms: f64,
    pub avg_query_ms: f64,
    pub memory_mb: f64,
    pub cache_hit_rate: f64,
    pub health_score: i32,
    pub command_count: i64,
    pub alert_count: i32,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
