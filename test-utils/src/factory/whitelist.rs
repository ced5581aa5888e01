//! Factory for `antinuke_whitelist` rows.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_snowflake;

/// Whitelists `user_id` in `guild_id`, attributed to a unique moderator.
pub async fn create_whitelist_entry(
    db: &DatabaseConnection,
    guild_id: &str,
    user_id: &str,
) -> Result<entity::antinuke_whitelist::Model, DbErr> {
    entity::antinuke_whitelist::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        added_by: ActiveValue::Set(next_snowflake()),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
