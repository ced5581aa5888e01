use chrono::{TimeDelta, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

use super::SchedulerContext;
use crate::server::{
    error::AppError, model::antinuke::MAX_WINDOW_SECONDS,
    service::antinuke::lockdown::LockdownService,
};

pub async fn register(scheduler: &JobScheduler, ctx: &SchedulerContext) -> Result<(), AppError> {
    let job_ctx = ctx.clone();
    scheduler
        .add(Job::new_async("0 * * * * *", move |_uuid, _lock| {
            let ctx = job_ctx.clone();
            Box::pin(async move {
                if let Err(e) = unlock_expired_lockdowns(&ctx).await {
                    tracing::error!("Error unlocking expired lockdowns: {}", e);
                }
            })
        })?)
        .await?;

    let job_ctx = ctx.clone();
    scheduler
        .add(Job::new_async("0 */5 * * * *", move |_uuid, _lock| {
            let ctx = job_ctx.clone();
            Box::pin(async move {
                match ctx.performance.save_metrics(&ctx.db).await {
                    Ok(metric) => tracing::debug!(
                        "Saved performance metrics (health {})",
                        metric.health_score
                    ),
                    Err(e) => tracing::error!("Error saving performance metrics: {}", e),
                }

                ctx.tracker
                    .prune_idle(Utc::now(), TimeDelta::seconds(MAX_WINDOW_SECONDS));
            })
        })?)
        .await?;

    Ok(())
}

async fn unlock_expired_lockdowns(ctx: &SchedulerContext) -> Result<(), AppError> {
    let unlocked = LockdownService::new(&ctx.db, &ctx.discord.http)
        .unlock_expired(Utc::now())
        .await?;

    if unlocked > 0 {
        tracing::info!("Lifted {} expired lockdown(s)", unlocked);
    }

    Ok(())
}
