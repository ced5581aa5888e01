use serenity::all::{Context, GuildChannel, Message};

use super::post_to_modlog;
use crate::server::{service::modlog, state::BotState};

/// Name of the channel's category, read from the cache.
fn category_name(ctx: &Context, channel: &GuildChannel) -> Option<String> {
    let parent_id = channel.parent_id?;
    ctx.cache
        .guild(channel.guild_id)
        .and_then(|guild| guild.channels.get(&parent_id).map(|c| c.name.clone()))
}

pub async fn handle_channel_create(state: &BotState, ctx: Context, channel: GuildChannel) {
    tracing::info!(
        "Channel {} ({}) created in guild {}",
        channel.name,
        channel.id,
        channel.guild_id
    );

    state.lifecycle.seed_webhooks(channel.id.get(), Vec::new());

    let category = category_name(&ctx, &channel);
    let embed = modlog::channel_created(&channel, category.as_deref());
    post_to_modlog(state, &ctx.http, channel.guild_id.get(), embed).await;
}

pub async fn handle_channel_delete(
    state: &BotState,
    ctx: Context,
    channel: GuildChannel,
    _messages: Option<Vec<Message>>,
) {
    tracing::info!(
        "Channel {} ({}) deleted in guild {}",
        channel.name,
        channel.id,
        channel.guild_id
    );

    state.lifecycle.forget_channel(channel.id.get());

    let category = category_name(&ctx, &channel);
    let embed = modlog::channel_deleted(&channel, category.as_deref());
    post_to_modlog(state, &ctx.http, channel.guild_id.get(), embed).await;
}
