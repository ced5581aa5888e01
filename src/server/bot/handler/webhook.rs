use std::time::Instant;

use serenity::all::{ChannelId, Context, GuildId};

use super::{guild::webhook_item, post_to_modlog, record_timing};
use crate::server::{service::modlog, state::BotState};

/// Refetches the channel's webhooks and logs what was created or deleted.
pub async fn handle_webhook_update(
    state: &BotState,
    ctx: Context,
    guild_id: GuildId,
    channel_id: ChannelId,
) {
    let started = Instant::now();

    let webhooks = match channel_id.webhooks(&ctx.http).await {
        Ok(webhooks) => webhooks,
        Err(e) => {
            tracing::debug!("Could not list webhooks of channel {}: {}", channel_id, e);
            return;
        }
    };

    let diff = state
        .lifecycle
        .diff_webhooks(channel_id.get(), webhooks.iter().map(webhook_item).collect());

    for webhook in &diff.created {
        tracing::info!("Webhook {} created in channel {}", webhook.id, channel_id);
        let embed = modlog::webhook_created(webhook.id, &webhook.name, channel_id.get());
        post_to_modlog(state, &ctx.http, guild_id.get(), embed).await;
    }

    for webhook in &diff.deleted {
        tracing::info!("Webhook {} deleted from channel {}", webhook.id, channel_id);
        let embed = modlog::webhook_deleted(webhook.id, &webhook.name, channel_id.get());
        post_to_modlog(state, &ctx.http, guild_id.get(), embed).await;
    }

    record_timing(state, "webhook_update", started).await;
}
