//! Background jobs, run with `tokio-cron-scheduler`.
//!
//! - every minute: unlock expired lockdowns
//! - every 5 minutes: persist performance metrics and prune idle anti-nuke windows
//! - hourly, and once a minute after startup: automatic guild backups
//! - every 30 or 60 minutes per bot list, first post 3 minutes after startup

pub mod backup;
pub mod bot_list;
pub mod maintenance;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::JobScheduler;

use crate::server::{
    error::AppError,
    service::{
        antinuke::tracker::ActionTracker, bot_list::BotListService,
        guild_config::GuildConfigService, performance::PerformanceMonitor,
    },
    state::DiscordHandles,
};

/// Everything the jobs need, cloned into each job.
#[derive(Clone)]
pub struct SchedulerContext {
    pub db: DatabaseConnection,
    pub discord: DiscordHandles,
    pub configs: GuildConfigService,
    pub performance: PerformanceMonitor,
    pub tracker: ActionTracker,
    pub bot_lists: BotListService,
}

/// Registers every job and starts the scheduler.
///
/// The returned scheduler must be shut down on exit.
pub async fn start_scheduler(ctx: SchedulerContext) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    maintenance::register(&scheduler, &ctx).await?;
    backup::register(&scheduler, &ctx).await?;
    bot_list::register(&scheduler, &ctx).await?;

    scheduler.start().await?;

    tracing::info!("Scheduler started");

    Ok(scheduler)
}
