//! Mod log embeds and posting.

use serenity::{
    all::{ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage, GuildChannel, Role, Timestamp},
    http::Http,
};

use crate::server::{error::AppError, model::guild_config::GuildConfig};

pub const COLOR_CREATED: u32 = 0x00ff00;
pub const COLOR_DELETED: u32 = 0xff0000;

/// Posts embeds to a guild's configured mod log channel.
pub struct ModLogService<'a> {
    http: &'a Http,
}

impl<'a> ModLogService<'a> {
    pub fn new(http: &'a Http) -> Self {
        Self { http }
    }

    /// Sends `embed` to the mod log channel.
    ///
    /// Returns false without calling Discord when the guild has no mod log configured.
    pub async fn post(&self, config: &GuildConfig, embed: CreateEmbed) -> Result<bool, AppError> {
        let Some(channel_id) = config.mod_log_channel_id else {
            return Ok(false);
        };

        ChannelId::new(channel_id)
            .send_message(self.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(true)
    }
}

fn base_embed(title: &str, color: u32) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .color(color)
        .footer(CreateEmbedFooter::new("Nexus Mod Log"))
        .timestamp(Timestamp::now())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// `category` is the parent channel's name when it is known.
pub fn channel_created(channel: &GuildChannel, category: Option<&str>) -> CreateEmbed {
    base_embed("➕ Channel Created", COLOR_CREATED)
        .field("Channel", format!("<#{}> ({})", channel.id, channel.name), true)
        .field("Type", channel.kind.name(), true)
        .field("Category", category.unwrap_or("None"), true)
        .field("NSFW", yes_no(channel.nsfw), true)
}

pub fn channel_deleted(channel: &GuildChannel, category: Option<&str>) -> CreateEmbed {
    base_embed("➖ Channel Deleted", COLOR_DELETED)
        .field("Channel", format!("#{} ({})", channel.name, channel.id), true)
        .field("Type", channel.kind.name(), true)
        .field("Category", category.unwrap_or("None"), true)
}

pub fn role_created(role: &Role) -> CreateEmbed {
    base_embed("➕ Role Created", COLOR_CREATED)
        .field("Role", format!("<@&{}> ({})", role.id, role.name), true)
        .field("Color", format!("#{:06x}", role.colour.0), true)
        .field("Position", role.position.to_string(), true)
        .field("Mentionable", yes_no(role.mentionable), true)
        .field("Hoisted", yes_no(role.hoist), true)
}

/// `role` is the cached role data, when the cache still had it.
pub fn role_deleted(role_id: u64, role: Option<&Role>) -> CreateEmbed {
    let name = role
        .map(|r| format!("@{} ({})", r.name, role_id))
        .unwrap_or_else(|| format!("Unknown role ({})", role_id));

    base_embed("➖ Role Deleted", COLOR_DELETED).field("Role", name, true)
}

pub fn emoji_created(emoji_id: u64, name: &str) -> CreateEmbed {
    base_embed("➕ Emoji Created", COLOR_CREATED)
        .field("Emoji", format!("<:{}:{}> :{}:", name, emoji_id, name), true)
}

pub fn emoji_deleted(emoji_id: u64, name: &str) -> CreateEmbed {
    base_embed("➖ Emoji Deleted", COLOR_DELETED)
        .field("Emoji", format!(":{}: ({})", name, emoji_id), true)
}

pub fn webhook_created(webhook_id: u64, name: &str, channel_id: u64) -> CreateEmbed {
    base_embed("➕ Webhook Created", COLOR_CREATED)
        .field("Webhook", format!("{} ({})", name, webhook_id), true)
        .field("Channel", format!("<#{}>", channel_id), true)
}

pub fn webhook_deleted(webhook_id: u64, name: &str, channel_id: u64) -> CreateEmbed {
    base_embed("➖ Webhook Deleted", COLOR_DELETED)
        .field("Webhook", format!("{} ({})", name, webhook_id), true)
        .field("Channel", format!("<#{}>", channel_id), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use test_utils::serenity::{create_test_channel, create_test_role};

    fn to_json(embed: CreateEmbed) -> Value {
        serde_json::to_value(embed).unwrap()
    }

    fn field<'v>(embed: &'v Value, name: &str) -> &'v str {
        embed["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == name)
            .and_then(|f| f["value"].as_str())
            .unwrap()
    }

    #[test]
    fn channel_created_embed_lists_channel_details() {
        let channel = create_test_channel(1, 20, "announcements", 0, Some(10));

        let embed = to_json(channel_created(&channel, Some("Info")));

        assert_eq!(embed["title"], "➕ Channel Created");
        assert_eq!(embed["color"], COLOR_CREATED);
        assert_eq!(field(&embed, "Channel"), "<#20> (announcements)");
        assert_eq!(field(&embed, "Type"), "text");
        assert_eq!(field(&embed, "Category"), "Info");
        assert_eq!(field(&embed, "NSFW"), "No");
    }

    #[test]
    fn role_created_embed_formats_color() {
        let role = create_test_role(30, "Moderators", 0x3498db, 4);

        let embed = to_json(role_created(&role));

        assert_eq!(embed["color"], COLOR_CREATED);
        assert_eq!(field(&embed, "Color"), "#3498db");
        assert_eq!(field(&embed, "Position"), "4");
        assert_eq!(field(&embed, "Hoisted"), "No");
    }

    #[test]
    fn deletion_embeds_are_red() {
        let channel = create_test_channel(1, 21, "general", 2, None);

        let channel_embed = to_json(channel_deleted(&channel, None));
        let role_embed = to_json(role_deleted(31, None));

        assert_eq!(channel_embed["color"], COLOR_DELETED);
        assert_eq!(field(&channel_embed, "Type"), "voice");
        assert_eq!(field(&channel_embed, "Category"), "None");
        assert_eq!(role_embed["title"], "➖ Role Deleted");
        assert_eq!(field(&role_embed, "Role"), "Unknown role (31)");
    }

    #[tokio::test]
    async fn post_without_mod_log_is_skipped() {
        let http = Http::new("");
        let config = GuildConfig::default_for(1);

        let posted = ModLogService::new(&http)
            .post(&config, emoji_deleted(5, "pepe"))
            .await
            .unwrap();

        assert!(!posted);
    }
}
