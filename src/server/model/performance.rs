use chrono::{DateTime, Utc};

/// A persisted performance snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetric {
    pub id: i32,
    pub avg_command_ms: f64,
    pub avg_query_ms: f64,
    pub memory_mb: f64,
    pub cache_hit_rate: f64,
    pub health_score: u8,
    pub command_count: u64,
    pub alert_count: u32,
    pub recorded_at: DateTime<Utc>,
}

impl PerformanceMetric {
    pub fn from_entity(entity: entity::performance_metric::Model) -> Self {
        Self {
            id: entity.id,
            avg_command_ms: entity.avg_command_ms,
            avg_query_ms: entity.avg_query_ms,
            memory_mb: entity.memory_mb,
            cache_hit_rate: entity.cache_hit_rate,
            health_score: entity.health_score.clamp(0, 100) as u8,
            command_count: entity.command_count.max(0) as u64,
            alert_count: entity.alert_count.max(0) as u32,
            recorded_at: entity.recorded_at,
        }
    }
}

/// Values sampled by the performance monitor for one persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMetricParam {
    pub avg_command_ms: f64,
    pub avg_query_ms: f64,
    pub memory_mb: f64,
    pub cache_hit_rate: f64,
    pub health_score: u8,
    pub command_count: u64,
    pub alert_count: u32,
}
