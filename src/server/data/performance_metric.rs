use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    QuerySelect,
};

use crate::server::model::performance::{CreateMetricParam, PerformanceMetric};

pub struct PerformanceMetricRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PerformanceMetricRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateMetricParam) -> Result<PerformanceMetric, DbErr> {
        let entity = entity::performance_metric::ActiveModel {
            avg_command_ms: ActiveValue::Set(param.avg_command_ms),
            avg_query_ms: ActiveValue::Set(param.avg_query_ms),
            memory_mb: ActiveValue::Set(param.memory_mb),
            cache_hit_rate: ActiveValue::Set(param.cache_hit_rate),
            health_score: ActiveValue::Set(param.health_score as i32),
            command_count: ActiveValue::Set(param.command_count as i64),
            alert_count: ActiveValue::Set(param.alert_count as i32),
            recorded_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(PerformanceMetric::from_entity(entity))
    }

    /// The `limit` most recent snapshots, newest first.
    pub async fn get_latest(&self, limit: u64) -> Result<Vec<PerformanceMetric>, DbErr> {
        Ok(entity::prelude::PerformanceMetric::find()
            .order_by_desc(entity::performance_metric::Column::RecordedAt)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(PerformanceMetric::from_entity)
            .collect())
    }
}
