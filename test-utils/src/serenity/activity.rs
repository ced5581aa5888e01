//! Fixtures for Serenity presence `Activity` objects.

use serenity::all::Activity;

/// Creates an activity of the given Discord activity type.
///
/// Types: 0 playing, 1 streaming, 2 listening, 3 watching, 4 custom status, 5 competing.
/// `state` carries the custom status text for type 4.
///
/// # Panics
/// - If the JSON cannot be deserialized into an Activity
pub fn create_test_activity(kind: u8, name: &str, state: Option<&str>) -> Activity {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "type": kind,
        "state": state,
        "created_at": 0,
    }))
    .expect("Failed to create test activity - invalid JSON structure")
}
