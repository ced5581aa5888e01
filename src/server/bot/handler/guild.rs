//! Guild availability handlers.
//!
//! `guild_create` fires on startup for every guild the bot is in, when the bot joins a new
//! guild, and when a guild comes back after an outage. Each time the guild row is refreshed,
//! the slash commands are registered for it and the emoji and webhook sets used by the
//! lifecycle diffing are seeded.
//!
//! `guild_delete` with `unavailable` set is an outage, not a removal, and is ignored.

use std::collections::HashMap;

use serenity::all::{Context, Guild, UnavailableGuild, Webhook};

use crate::server::{
    bot::command::register_guild_commands,
    data::guild::DiscordGuildRepository,
    error::log_bot_error,
    service::lifecycle::KnownItem,
    state::BotState,
};

pub async fn handle_guild_create(
    state: &BotState,
    ctx: Context,
    guild: Guild,
    is_new: Option<bool>,
) {
    let guild_id = guild.id.get();

    tracing::debug!(
        "Guild create event: {} ({}) - member_count: {}, new: {}",
        guild.name,
        guild_id,
        guild.member_count,
        is_new.unwrap_or(false)
    );

    if let Err(e) = DiscordGuildRepository::new(&state.db).upsert(&guild).await {
        tracing::error!("Failed to upsert guild {}: {:?}", guild_id, e);
    }

    match register_guild_commands(&ctx.http, guild.id).await {
        Ok(count) => tracing::debug!("Registered {} commands in guild {}", count, guild_id),
        Err(e) => log_bot_error(
            &format!("Failed to register commands in guild {}", guild_id),
            &e,
        ),
    }

    state.lifecycle.seed_emojis(
        guild_id,
        guild
            .emojis
            .values()
            .map(|emoji| KnownItem::new(emoji.id.get(), emoji.name.clone()))
            .collect(),
    );

    // Needs MANAGE_WEBHOOKS; without it webhook changes are not diffed.
    match guild.id.webhooks(&ctx.http).await {
        Ok(webhooks) => {
            let mut by_channel = group_by_channel(webhooks);
            for channel_id in guild.channels.keys() {
                let known = by_channel.remove(&channel_id.get()).unwrap_or_default();
                state.lifecycle.seed_webhooks(channel_id.get(), known);
            }
        }
        Err(e) => tracing::debug!("Could not list webhooks of guild {}: {}", guild_id, e),
    }

    if is_new == Some(true) {
        tracing::info!("Joined guild {} ({})", guild.name, guild_id);
    }
}

pub async fn handle_guild_delete(
    state: &BotState,
    _ctx: Context,
    incomplete: UnavailableGuild,
    full: Option<Guild>,
) {
    if incomplete.unavailable {
        tracing::warn!("Guild {} became unavailable", incomplete.id);
        return;
    }

    let guild_id = incomplete.id.get();

    if let Err(e) = DiscordGuildRepository::new(&state.db).delete(guild_id).await {
        tracing::error!("Failed to delete guild {}: {:?}", guild_id, e);
    }

    state.configs.invalidate(guild_id);
    state.presence.forget_guild(guild_id);

    let channel_ids: Vec<u64> = full
        .map(|guild| guild.channels.keys().map(|id| id.get()).collect())
        .unwrap_or_default();
    state.lifecycle.forget_guild(guild_id, &channel_ids);

    tracing::info!("Removed from guild {}", guild_id);
}

fn group_by_channel(webhooks: Vec<Webhook>) -> HashMap<u64, Vec<KnownItem>> {
    let mut grouped: HashMap<u64, Vec<KnownItem>> = HashMap::new();
    for webhook in webhooks {
        let Some(channel_id) = webhook.channel_id else {
            continue;
        };
        grouped
            .entry(channel_id.get())
            .or_default()
            .push(webhook_item(&webhook));
    }
    grouped
}

pub(super) fn webhook_item(webhook: &Webhook) -> KnownItem {
    KnownItem::new(
        webhook.id.get(),
        webhook.name.clone().unwrap_or_else(|| "Unnamed".to_string()),
    )
}
