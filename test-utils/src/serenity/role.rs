//! Fixtures for Serenity `Role` objects.

use serde_json::Value;
use serenity::all::Role;

/// Builds the JSON payload of a role with the given permission bits.
///
/// Used directly when embedding roles in a guild payload.
pub fn role_json(role_id: u64, name: &str, color: u32, position: i16, permissions: u64) -> Value {
    serde_json::json!({
        "id": role_id.to_string(),
        "name": name,
        "color": color,
        "hoist": false,
        "icon": null,
        "unicode_emoji": null,
        "position": position,
        "permissions": permissions.to_string(),
        "managed": false,
        "mentionable": false,
    })
}

/// Creates a role with zero permissions, not hoisted and not mentionable.
///
/// # Panics
/// - If the JSON cannot be deserialized into a Role
pub fn create_test_role(role_id: u64, name: &str, color: u32, position: i16) -> Role {
    serde_json::from_value(role_json(role_id, name, color, position, 0))
        .expect("Failed to create test role - invalid JSON structure")
}
