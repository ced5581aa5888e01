use std::time::Instant;

use chrono::Utc;
use serenity::all::{Context, Presence};

use super::record_timing;
use crate::server::{
    error::log_bot_error,
    service::presence::{PresenceChange, PresenceService, RoleHierarchy},
    state::BotState,
};

/// Feeds presence updates to verification, status roles and activity analytics.
pub async fn handle_presence_update(state: &BotState, ctx: Context, presence: Presence) {
    let Some(guild_id) = presence.guild_id else {
        return;
    };
    if presence.user.bot == Some(true) {
        return;
    }

    let config = match state.configs.get(guild_id.get()).await {
        Ok(config) => config,
        Err(e) => {
            log_bot_error(&format!("Failed to load config of guild {}", guild_id), &e);
            return;
        }
    };

    if !config.presence_verification_enabled
        && !config.status_roles_enabled
        && !config.activity_analytics_enabled
    {
        return;
    }

    let started = Instant::now();
    let bot_user_id = ctx.cache.current_user().id.get();
    let hierarchy = ctx
        .cache
        .guild(guild_id)
        .map(|guild| RoleHierarchy::from_guild(&guild, bot_user_id))
        .unwrap_or_default();

    let change = PresenceChange {
        guild_id: guild_id.get(),
        user_id: presence.user.id.get(),
        status: presence.status,
        activities: &presence.activities,
        at: Utc::now(),
    };

    PresenceService::new(&state.db, &ctx.http, &state.presence)
        .handle(&config, &change, &hierarchy)
        .await;

    record_timing(state, "presence_update", started).await;
}
