use std::{collections::HashMap, time::Instant};

use serenity::all::{Context, Emoji, EmojiId, GuildId};

use super::{post_to_modlog, record_timing};
use crate::server::{
    service::{lifecycle::KnownItem, modlog},
    state::BotState,
};

/// Diffs the full emoji list against the last one seen and logs each change.
pub async fn handle_emojis_update(
    state: &BotState,
    ctx: Context,
    guild_id: GuildId,
    current_state: HashMap<EmojiId, Emoji>,
) {
    let started = Instant::now();
    let current = current_state
        .values()
        .map(|emoji| KnownItem::new(emoji.id.get(), emoji.name.clone()))
        .collect();

    let diff = state.lifecycle.diff_emojis(guild_id.get(), current);

    for emoji in &diff.created {
        tracing::info!("Emoji {} ({}) created in guild {}", emoji.name, emoji.id, guild_id);
        let embed = modlog::emoji_created(emoji.id, &emoji.name);
        post_to_modlog(state, &ctx.http, guild_id.get(), embed).await;
    }

    for emoji in &diff.deleted {
        tracing::info!("Emoji {} ({}) deleted in guild {}", emoji.name, emoji.id, guild_id);
        let embed = modlog::emoji_deleted(emoji.id, &emoji.name);
        post_to_modlog(state, &ctx.http, guild_id.get(), embed).await;
    }

    record_timing(state, "emoji_update", started).await;
}
