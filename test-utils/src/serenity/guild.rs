//! Fixtures for Serenity `Guild` objects.

use serde_json::Value;
use serenity::all::Guild;

use crate::serenity::channel::channel_json;

/// Creates a guild without roles or channels.
///
/// The icon hash is padded to Discord's 32 character format when shorter.
///
/// # Panics
/// - If the JSON cannot be deserialized into a Guild
pub fn create_test_guild(guild_id: u64, name: &str, icon_hash: Option<&str>) -> Guild {
    guild_from_parts(guild_id, name, icon_hash, Vec::new(), Vec::new())
}

/// Creates a guild with the given role payloads and `(id, name, kind, parent)` channels.
///
/// Build role payloads with [`crate::serenity::role_json`].
pub fn create_test_guild_with(
    guild_id: u64,
    name: &str,
    roles: Vec<Value>,
    channels: &[(u64, &str, u8, Option<u64>)],
) -> Guild {
    let channels = channels
        .iter()
        .map(|(id, name, kind, parent)| channel_json(guild_id, *id, name, *kind, *parent))
        .collect();

    guild_from_parts(guild_id, name, None, roles, channels)
}

fn guild_from_parts(
    guild_id: u64,
    name: &str,
    icon_hash: Option<&str>,
    roles: Vec<Value>,
    channels: Vec<Value>,
) -> Guild {
    let formatted_icon = icon_hash.map(|hash| {
        if hash.len() < 32 {
            format!("{:0<32}", hash)
        } else {
            hash.to_string()
        }
    });

    serde_json::from_value(serde_json::json!({
        "id": guild_id.to_string(),
        "name": name,
        "icon": formatted_icon,
        "icon_hash": formatted_icon,
        "owner_id": "100000000000000000",
        "afk_timeout": 300,
        "verification_level": 0,
        "default_message_notifications": 0,
        "explicit_content_filter": 0,
        "roles": roles,
        "emojis": [],
        "stickers": [],
        "features": [],
        "mfa_level": 0,
        "system_channel_flags": 0,
        "premium_tier": 0,
        "premium_subscription_count": 0,
        "premium_progress_bar_enabled": false,
        "preferred_locale": "en-US",
        "nsfw_level": 0,
        "joined_at": "2020-01-01T00:00:00.000000+00:00",
        "large": false,
        "member_count": 100,
        "voice_states": [],
        "channels": channels,
        "threads": [],
        "presences": [],
        "max_presences": 25000,
        "max_members": 100000,
        "unavailable": false,
        "members": [],
        "stage_instances": [],
        "guild_scheduled_events": [],
    }))
    .expect("Failed to create test guild - invalid JSON structure")
}
