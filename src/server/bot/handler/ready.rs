//! Ready event handler.
//!
//! Fires once per shard after the gateway handshake. Slash commands are registered per
//! guild in `guild_create`; global commands left over from older deployments are cleared
//! here.

use serenity::all::{ActivityData, Command, Context, Ready};

pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord (shard {:?}, {} guilds)",
        ready.user.name,
        ready.shard.map(|s| s.id.0),
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::watching("for nukes | /threatdashboard")));

    match Command::set_global_commands(&ctx.http, Vec::new()).await {
        Ok(_) => tracing::debug!("Cleared global commands"),
        Err(e) => tracing::warn!("Failed to clear global commands: {}", e),
    }
}
