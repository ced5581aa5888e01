//! In-process performance monitor.
//!
//! Keeps bounded buffers of command, query and event timings, memory samples and alerts,
//! and derives a health score and tuning recommendations from them. A snapshot is
//! persisted to `performance_metric` every five minutes by the scheduler.

use std::{
    collections::VecDeque,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use sysinfo::{Pid, System};
use tokio::sync::RwLock;

use crate::server::{
    data::performance_metric::PerformanceMetricRepository,
    error::AppError,
    model::performance::{CreateMetricParam, PerformanceMetric},
};

pub const SLOW_COMMAND_MS: u64 = 1000;
pub const SLOW_QUERY_MS: u64 = 500;
pub const MEMORY_THRESHOLD_MB: f64 = 512.0;

const MAX_SAMPLES: usize = 1000;
const MAX_ALERTS: usize = 100;
const VERY_SLOW_COMMAND_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct PerformanceAlert {
    pub kind: &'static str,
    pub message: String,
    pub level: AlertLevel,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Timing {
    pub name: String,
    pub duration_ms: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Health {
    pub status: HealthStatus,
    pub score: u8,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Medium,
    High,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub area: &'static str,
    pub priority: Priority,
    pub message: String,
}

/// Point-in-time view of every monitor buffer.
#[derive(Debug, Clone)]
pub struct PerformanceStats {
    pub uptime: Duration,
    pub memory_mb: Option<f64>,
    pub command_count: usize,
    pub avg_command_ms: f64,
    pub slowest_commands: Vec<Timing>,
    pub query_count: usize,
    pub avg_query_ms: f64,
    pub slowest_queries: Vec<Timing>,
    pub event_count: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub health: Health,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Default)]
struct Buffers {
    commands: VecDeque<Timing>,
    queries: VecDeque<Timing>,
    events: VecDeque<Timing>,
    memory: VecDeque<f64>,
    alerts: VecDeque<PerformanceAlert>,
}

fn push_capped<T>(buffer: &mut VecDeque<T>, value: T, cap: usize) {
    buffer.push_back(value);
    while buffer.len() > cap {
        buffer.pop_front();
    }
}

fn average(timings: &VecDeque<Timing>) -> f64 {
    if timings.is_empty() {
        return 0.0;
    }
    timings.iter().map(|t| t.duration_ms as f64).sum::<f64>() / timings.len() as f64
}

fn slowest(timings: &VecDeque<Timing>, limit: usize) -> Vec<Timing> {
    let mut sorted: Vec<Timing> = timings.iter().cloned().collect();
    sorted.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
    sorted.truncate(limit);
    sorted
}

/// Cheap to clone; all clones share the same buffers.
#[derive(Clone)]
pub struct PerformanceMonitor {
    buffers: Arc<RwLock<Buffers>>,
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
    started_at: DateTime<Utc>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            buffers: Arc::new(RwLock::new(Buffers::default())),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
            started_at: Utc::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        Utc::now() - self.started_at
    }

    /// Records a command execution and raises a warning alert above [`SLOW_COMMAND_MS`].
    pub async fn record_command(&self, command: &str, duration_ms: u64) {
        let mut buffers = self.buffers.write().await;
        push_capped(
            &mut buffers.commands,
            Timing {
                name: command.to_string(),
                duration_ms,
                at: Utc::now(),
            },
            MAX_SAMPLES,
        );

        if duration_ms > SLOW_COMMAND_MS {
            tracing::warn!("Slow command detected: {} took {}ms", command, duration_ms);
            push_alert(
                &mut buffers.alerts,
                "slow_command",
                format!(
                    "Command {} took {}ms (threshold: {}ms)",
                    command, duration_ms, SLOW_COMMAND_MS
                ),
                AlertLevel::Warning,
            );
        }
    }

    /// Records a failed command as an error alert.
    pub async fn record_command_error(&self, command: &str, error: &str) {
        let mut buffers = self.buffers.write().await;
        push_alert(
            &mut buffers.alerts,
            "command_error",
            format!("Command {} failed: {}", command, error),
            AlertLevel::Error,
        );
    }

    pub async fn record_query(&self, query: &str, duration_ms: u64) {
        let mut buffers = self.buffers.write().await;
        push_capped(
            &mut buffers.queries,
            Timing {
                name: query.chars().take(100).collect(),
                duration_ms,
                at: Utc::now(),
            },
            MAX_SAMPLES,
        );

        if duration_ms > SLOW_QUERY_MS {
            tracing::warn!("Slow query detected: {}ms - {}", duration_ms, query);
            push_alert(
                &mut buffers.alerts,
                "slow_query",
                format!("Database query took {}ms: {}", duration_ms, query),
                AlertLevel::Warning,
            );
        }
    }

    pub async fn record_event(&self, event: &str, duration_ms: u64) {
        let mut buffers = self.buffers.write().await;
        push_capped(
            &mut buffers.events,
            Timing {
                name: event.to_string(),
                duration_ms,
                at: Utc::now(),
            },
            MAX_SAMPLES,
        );
    }

    pub async fn record_memory(&self, memory_mb: f64) {
        let mut buffers = self.buffers.write().await;
        push_capped(&mut buffers.memory, memory_mb, MAX_SAMPLES);

        if memory_mb > MEMORY_THRESHOLD_MB {
            push_alert(
                &mut buffers.alerts,
                "high_memory",
                format!(
                    "Memory usage {:.0}MB (threshold: {:.0}MB)",
                    memory_mb, MEMORY_THRESHOLD_MB
                ),
                AlertLevel::Warning,
            );
        }
    }

    /// Samples this process' resident memory and records it.
    pub async fn sample_memory(&self) -> Option<f64> {
        let memory_mb = current_memory_mb()?;
        self.record_memory(memory_mb).await;
        Some(memory_mb)
    }

    /// Awaits `query`, recording how long it took under `name`.
    pub async fn track_query<T, F>(&self, name: &str, query: F) -> T
    where
        F: Future<Output = T>,
    {
        let start = Instant::now();
        let result = query.await;
        self.record_query(name, start.elapsed().as_millis() as u64)
            .await;
        result
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Hit rate in percent, 0 before any lookup.
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let total = hits + self.cache_misses.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64 * 100.0
    }

    pub async fn alerts(&self) -> Vec<PerformanceAlert> {
        self.buffers.read().await.alerts.iter().cloned().collect()
    }

    pub async fn health(&self) -> Health {
        let buffers = self.buffers.read().await;
        health_of(&buffers, Utc::now())
    }

    pub async fn recommendations(&self) -> Vec<Recommendation> {
        let buffers = self.buffers.read().await;
        self.recommendations_of(&buffers)
    }

    pub async fn stats(&self) -> PerformanceStats {
        let buffers = self.buffers.read().await;

        PerformanceStats {
            uptime: self.uptime(),
            memory_mb: buffers.memory.back().copied(),
            command_count: buffers.commands.len(),
            avg_command_ms: average(&buffers.commands),
            slowest_commands: slowest(&buffers.commands, 5),
            query_count: buffers.queries.len(),
            avg_query_ms: average(&buffers.queries),
            slowest_queries: slowest(&buffers.queries, 5),
            event_count: buffers.events.len(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: self.cache_hit_rate(),
            health: health_of(&buffers, Utc::now()),
            recommendations: self.recommendations_of(&buffers),
        }
    }

    /// Samples memory and persists the current averages.
    pub async fn save_metrics(&self, db: &DatabaseConnection) -> Result<PerformanceMetric, AppError> {
        self.sample_memory().await;
        let stats = self.stats().await;

        let metric = PerformanceMetricRepository::new(db)
            .create(CreateMetricParam {
                avg_command_ms: stats.avg_command_ms,
                avg_query_ms: stats.avg_query_ms,
                memory_mb: stats.memory_mb.unwrap_or_default(),
                cache_hit_rate: stats.cache_hit_rate,
                health_score: stats.health.score,
                command_count: stats.command_count as u64,
                alert_count: self.buffers.read().await.alerts.len() as u32,
            })
            .await?;

        Ok(metric)
    }

    fn recommendations_of(&self, buffers: &Buffers) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        let avg_query = average(&buffers.queries);
        let avg_command = average(&buffers.commands);

        if avg_query > 100.0 {
            recommendations.push(Recommendation {
                area: "database",
                priority: Priority::High,
                message: "Database queries are slow. Consider adding indexes or optimizing queries."
                    .to_string(),
            });
        }

        if avg_command > 500.0 {
            recommendations.push(Recommendation {
                area: "commands",
                priority: Priority::Medium,
                message: "Commands are responding slowly. Review command logic and API calls."
                    .to_string(),
            });
        }

        if buffers.memory.back().is_some_and(|mb| *mb > 400.0) {
            recommendations.push(Recommendation {
                area: "memory",
                priority: Priority::High,
                message: "Memory usage is high. Check for leaks or oversized caches.".to_string(),
            });
        }

        let lookups =
            self.cache_hits.load(Ordering::Relaxed) + self.cache_misses.load(Ordering::Relaxed);
        let hit_rate = self.cache_hit_rate();
        if lookups > 100 && hit_rate < 80.0 {
            recommendations.push(Recommendation {
                area: "cache",
                priority: Priority::Medium,
                message: format!(
                    "Cache hit rate is {:.2}%. Consider caching more frequently accessed data.",
                    hit_rate
                ),
            });
        }

        let very_slow: Vec<String> = slowest(&buffers.commands, 5)
            .into_iter()
            .filter(|t| t.duration_ms > VERY_SLOW_COMMAND_MS)
            .map(|t| t.name)
            .collect();
        if !very_slow.is_empty() {
            recommendations.push(Recommendation {
                area: "commands",
                priority: Priority::High,
                message: format!(
                    "{} commands taking >2s: {}",
                    very_slow.len(),
                    very_slow.join(", ")
                ),
            });
        }

        recommendations
    }
}

fn push_alert(
    alerts: &mut VecDeque<PerformanceAlert>,
    kind: &'static str,
    message: String,
    level: AlertLevel,
) {
    push_capped(
        alerts,
        PerformanceAlert {
            kind,
            message,
            level,
            at: Utc::now(),
        },
        MAX_ALERTS,
    );
}

fn health_of(buffers: &Buffers, now: DateTime<Utc>) -> Health {
    let mut score: i32 = 100;
    let mut issues = Vec::new();
    let mut status = HealthStatus::Healthy;

    if let Some(memory) = buffers.memory.back().filter(|mb| **mb > MEMORY_THRESHOLD_MB) {
        status = HealthStatus::Degraded;
        issues.push(format!(
            "High memory usage: {:.0}MB (threshold: {:.0}MB)",
            memory, MEMORY_THRESHOLD_MB
        ));
        score -= 20;
    }

    let avg_command = average(&buffers.commands);
    if avg_command > (SLOW_COMMAND_MS / 2) as f64 {
        status = HealthStatus::Degraded;
        issues.push(format!(
            "Slow command execution: {:.2}ms average",
            avg_command
        ));
        score -= 15;
    }

    let avg_query = average(&buffers.queries);
    if avg_query > (SLOW_QUERY_MS / 2) as f64 {
        status = HealthStatus::Degraded;
        issues.push(format!("Slow database queries: {:.2}ms average", avg_query));
        score -= 15;
    }

    let cutoff = now - Duration::minutes(5);
    let recent_errors = buffers
        .alerts
        .iter()
        .filter(|a| a.level == AlertLevel::Error && a.at > cutoff)
        .count();
    if recent_errors > 10 {
        status = HealthStatus::Unhealthy;
        issues.push(format!(
            "High error rate: {} errors in 5 minutes",
            recent_errors
        ));
        score -= 30;
    }

    Health {
        status,
        score: score.max(0) as u8,
        issues,
    }
}

/// Resident memory of this process in MiB.
pub fn current_memory_mb() -> Option<f64> {
    const MEBIBYTE: f64 = 1024.0 * 1024.0;

    let pid = Pid::from(std::process::id() as usize);
    let mut system = System::new();
    system.refresh_process(pid);

    system
        .process(pid)
        .map(|process| process.memory() as f64 / MEBIBYTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::builder::TestBuilder;

    #[tokio::test]
    async fn fresh_monitor_is_healthy() {
        let monitor = PerformanceMonitor::new();

        let health = monitor.health().await;

        assert_eq!(health.score, 100);
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(monitor.recommendations().await.is_empty());
    }

    #[tokio::test]
    async fn caps_command_buffer() {
        let monitor = PerformanceMonitor::new();

        for _ in 0..1005 {
            monitor.record_command("bulk", 10).await;
        }

        assert_eq!(monitor.stats().await.command_count, 1000);
    }

    #[tokio::test]
    async fn slow_commands_raise_alerts_and_lower_health() {
        let monitor = PerformanceMonitor::new();

        monitor.record_command("threatdashboard", 2500).await;

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "slow_command");

        let health = monitor.health().await;
        assert_eq!(health.score, 85);
        assert_eq!(health.status, HealthStatus::Degraded);

        let recommendations = monitor.recommendations().await;
        assert!(recommendations
            .iter()
            .any(|r| r.message.contains("threatdashboard")));
    }

    #[tokio::test]
    async fn stacks_every_health_penalty() {
        let monitor = PerformanceMonitor::new();

        monitor.record_memory(900.0).await;
        monitor.record_command("bulk", 800).await;
        monitor.record_query("SELECT", 400).await;
        for _ in 0..11 {
            monitor.record_command_error("bulk", "boom").await;
        }

        let health = monitor.health().await;

        assert_eq!(health.score, 20);
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.issues.len(), 4);
    }

    #[tokio::test]
    async fn alert_buffer_keeps_last_hundred() {
        let monitor = PerformanceMonitor::new();

        for _ in 0..150 {
            monitor.record_command_error("x", "e").await;
        }

        assert_eq!(monitor.alerts().await.len(), 100);
    }

    #[tokio::test]
    async fn recommends_caching_on_low_hit_rate() {
        let monitor = PerformanceMonitor::new();

        for _ in 0..50 {
            monitor.record_cache_hit();
        }
        for _ in 0..60 {
            monitor.record_cache_miss();
        }

        assert!(monitor.cache_hit_rate() < 80.0);
        assert!(monitor
            .recommendations()
            .await
            .iter()
            .any(|r| r.area == "cache"));
    }

    #[tokio::test]
    async fn persists_metrics() {
        let test = TestBuilder::new().with_log_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let monitor = PerformanceMonitor::new();

        monitor.record_command("bulk", 120).await;
        let metric = monitor.save_metrics(db).await.unwrap();

        assert_eq!(metric.command_count, 1);
        assert_eq!(metric.avg_command_ms, 120.0);
    }
}
