use serenity::all::{Context, GuildId, Role, RoleId};

use super::post_to_modlog;
use crate::server::{service::modlog, state::BotState};

pub async fn handle_guild_role_create(state: &BotState, ctx: Context, role: Role) {
    tracing::info!("Created role {} in guild {}", role.name, role.guild_id);

    post_to_modlog(state, &ctx.http, role.guild_id.get(), modlog::role_created(&role)).await;
}

/// `role` is only present when the role was cached.
pub async fn handle_guild_role_delete(
    state: &BotState,
    ctx: Context,
    guild_id: GuildId,
    role_id: RoleId,
    role: Option<Role>,
) {
    tracing::info!("Deleted role {} from guild {}", role_id, guild_id);

    let embed = modlog::role_deleted(role_id.get(), role.as_ref());
    post_to_modlog(state, &ctx.http, guild_id.get(), embed).await;
}
