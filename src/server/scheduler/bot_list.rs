use std::time::Duration;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::SchedulerContext;
use crate::server::{
    error::AppError,
    service::{
        bot_list::{BotList, PostResult},
        stats::{bot_list_stats, shard_count, CacheCounts},
    },
};

const FIRST_POST_DELAY: Duration = Duration::from_secs(180);

/// Schedules each list that has a token; lists without one are never posted to.
pub async fn register(scheduler: &JobScheduler, ctx: &SchedulerContext) -> Result<(), AppError> {
    let lists = ctx.bot_lists.configured();
    if lists.is_empty() {
        tracing::info!("No bot list tokens configured, stats posting disabled");
        return Ok(());
    }

    for list in lists {
        let job_ctx = ctx.clone();
        scheduler
            .add(Job::new_one_shot_async(FIRST_POST_DELAY, move |_uuid, _lock| {
                let ctx = job_ctx.clone();
                Box::pin(async move { post_stats(&ctx, list).await })
            })?)
            .await?;

        let job_ctx = ctx.clone();
        let interval = Duration::from_secs(list.interval_minutes() * 60);
        scheduler
            .add(Job::new_repeated_async(interval, move |_uuid, _lock| {
                let ctx = job_ctx.clone();
                Box::pin(async move { post_stats(&ctx, list).await })
            })?)
            .await?;

        tracing::info!(
            "Posting stats to {} every {} minutes",
            list.name(),
            list.interval_minutes()
        );
    }

    Ok(())
}

async fn post_stats(ctx: &SchedulerContext, list: BotList) {
    let bot_id = ctx.discord.cache.current_user().id.get();
    let counts = CacheCounts::from_cache(&ctx.discord.cache);
    let shards = shard_count(&ctx.discord.shard_manager).await;
    let stats = bot_list_stats(counts, shards);

    match ctx.bot_lists.post(list, bot_id, &stats, Utc::now()).await {
        Ok(PostResult::Posted) | Ok(PostResult::NoToken) => {}
        Ok(PostResult::Cooldown { wait_secs }) => {
            tracing::debug!("Skipped {} post, {}s of cooldown left", list.name(), wait_secs)
        }
        Ok(PostResult::RateLimited) => {}
        Err(e) => tracing::error!("Failed to post stats to {}: {}", list.name(), e),
    }
}
