use std::{collections::HashMap, time::Instant};

use serenity::all::{
    AuditLogEntry, ChannelId, Context, CreateEmbed, Emoji, EmojiId, EventHandler, Guild,
    GuildChannel, GuildId, Interaction, Message, Presence, Ready, Role, RoleId, UnavailableGuild,
};
use serenity::async_trait;
use serenity::http::Http;

use crate::server::{error::log_bot_error, service::modlog::ModLogService, state::BotState};

pub mod audit_log;
pub mod channel;
pub mod emoji;
pub mod guild;
pub mod interaction;
pub mod message;
pub mod presence;
pub mod ready;
pub mod role;
pub mod webhook;

/// Discord bot event handler
pub struct Handler {
    pub state: BotState,
}

impl Handler {
    pub fn new(state: BotState) -> Self {
        Self { state }
    }
}

/// Posts an embed to the guild's mod log. Failures are logged.
pub(crate) async fn post_to_modlog(state: &BotState, http: &Http, guild_id: u64, embed: CreateEmbed) {
    let config = match state.configs.get(guild_id).await {
        Ok(config) => config,
        Err(e) => {
            log_bot_error(&format!("Failed to load config of guild {}", guild_id), &e);
            return;
        }
    };

    if let Err(e) = ModLogService::new(http).post(&config, embed).await {
        log_bot_error(
            &format!("Failed to post to mod log of guild {}", guild_id),
            &e,
        );
    }
}

/// Records how long handling `event` took.
pub(crate) async fn record_timing(state: &BotState, event: &str, started: Instant) {
    state
        .performance
        .record_event(event, started.elapsed().as_millis() as u64)
        .await;
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called when a guild becomes available or the bot joins a new guild
    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        guild::handle_guild_create(&self.state, ctx, guild, is_new).await;
    }

    /// Called when the bot leaves a guild or it becomes unavailable
    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        guild::handle_guild_delete(&self.state, ctx, incomplete, full).await;
    }

    /// Called for every new audit log entry; the anti-nuke feed
    async fn guild_audit_log_entry_create(
        &self,
        ctx: Context,
        entry: AuditLogEntry,
        guild_id: GuildId,
    ) {
        audit_log::handle_audit_log_entry(&self.state, ctx, entry, guild_id).await;
    }

    /// Called when a channel is created in a guild
    async fn channel_create(&self, ctx: Context, channel: GuildChannel) {
        channel::handle_channel_create(&self.state, ctx, channel).await;
    }

    /// Called when a channel is deleted from a guild
    async fn channel_delete(
        &self,
        ctx: Context,
        channel: GuildChannel,
        messages: Option<Vec<Message>>,
    ) {
        channel::handle_channel_delete(&self.state, ctx, channel, messages).await;
    }

    /// Called when a role is created in a guild
    async fn guild_role_create(&self, ctx: Context, new: Role) {
        role::handle_guild_role_create(&self.state, ctx, new).await;
    }

    /// Called when a role is deleted from a guild
    async fn guild_role_delete(
        &self,
        ctx: Context,
        guild_id: GuildId,
        removed_role_id: RoleId,
        removed_role_data_if_in_cache: Option<Role>,
    ) {
        role::handle_guild_role_delete(
            &self.state,
            ctx,
            guild_id,
            removed_role_id,
            removed_role_data_if_in_cache,
        )
        .await;
    }

    /// Called with the full emoji list whenever a guild's emojis change
    async fn guild_emojis_update(
        &self,
        ctx: Context,
        guild_id: GuildId,
        current_state: HashMap<EmojiId, Emoji>,
    ) {
        emoji::handle_emojis_update(&self.state, ctx, guild_id, current_state).await;
    }

    /// Called when a channel's webhooks change
    async fn webhook_update(
        &self,
        ctx: Context,
        guild_id: GuildId,
        belongs_to_channel_id: ChannelId,
    ) {
        webhook::handle_webhook_update(&self.state, ctx, guild_id, belongs_to_channel_id).await;
    }

    /// Called when a member's status or activities change
    async fn presence_update(&self, ctx: Context, new_data: Presence) {
        presence::handle_presence_update(&self.state, ctx, new_data).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, new_message: Message) {
        message::handle_message(&self.state, ctx, new_message).await;
    }

    /// Called for slash commands and component interactions
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, ctx, interaction).await;
    }
}
