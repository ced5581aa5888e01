use std::time::Duration;

use chrono::Utc;
use serenity::all::Guild;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::SchedulerContext;
use crate::server::{error::AppError, service::backup::BackupService};

const INITIAL_DELAY: Duration = Duration::from_secs(60);

pub async fn register(scheduler: &JobScheduler, ctx: &SchedulerContext) -> Result<(), AppError> {
    let job_ctx = ctx.clone();
    scheduler
        .add(Job::new_one_shot_async(INITIAL_DELAY, move |_uuid, _lock| {
            let ctx = job_ctx.clone();
            Box::pin(async move { run_backups(&ctx).await })
        })?)
        .await?;

    let job_ctx = ctx.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _lock| {
            let ctx = job_ctx.clone();
            Box::pin(async move { run_backups(&ctx).await })
        })?)
        .await?;

    Ok(())
}

/// Cached guilds, cloned out so no cache lock is held across the backups.
fn cached_guilds(ctx: &SchedulerContext) -> Vec<Guild> {
    let cache = &ctx.discord.cache;
    cache
        .guilds()
        .into_iter()
        .filter_map(|id| cache.guild(id).map(|guild| Guild::clone(&guild)))
        .collect()
}

async fn run_backups(ctx: &SchedulerContext) {
    let guilds = cached_guilds(ctx);
    let created = BackupService::new(&ctx.db, &ctx.configs)
        .run(&guilds, Utc::now())
        .await;

    if created > 0 {
        tracing::info!("Created {} automatic backup(s)", created);
    }
}
