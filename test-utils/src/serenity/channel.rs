//! Fixtures for Serenity `GuildChannel` objects.

use serde_json::Value;
use serenity::all::GuildChannel;

/// Builds the JSON payload of a guild channel.
///
/// `kind` uses Discord's numeric channel types (0 text, 2 voice, 4 category).
pub fn channel_json(
    guild_id: u64,
    channel_id: u64,
    name: &str,
    kind: u8,
    parent_id: Option<u64>,
) -> Value {
    serde_json::json!({
        "id": channel_id.to_string(),
        "guild_id": guild_id.to_string(),
        "type": kind,
        "name": name,
        "position": 0,
        "permission_overwrites": [],
        "nsfw": false,
        "parent_id": parent_id.map(|id| id.to_string()),
    })
}

/// Creates a guild channel belonging to `guild_id`.
///
/// # Panics
/// - If the JSON cannot be deserialized into a GuildChannel
pub fn create_test_channel(
    guild_id: u64,
    channel_id: u64,
    name: &str,
    kind: u8,
    parent_id: Option<u64>,
) -> GuildChannel {
    serde_json::from_value(channel_json(guild_id, channel_id, name, kind, parent_id))
        .expect("Failed to create test channel - invalid JSON structure")
}
