//! Factory for `moderation_case` rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_snowflake;

pub struct ModerationCaseFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    user_id: String,
    moderator_id: String,
    action: String,
    created_at: DateTime<Utc>,
}

impl<'a> ModerationCaseFactory<'a> {
    /// Defaults: a `ban` of a unique user by a unique moderator, created now.
    pub fn new(db: &'a DatabaseConnection, guild_id: &str) -> Self {
        Self {
            db,
            guild_id: guild_id.to_string(),
            user_id: next_snowflake(),
            moderator_id: next_snowflake(),
            action: "ban".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub async fn build(self) -> Result<entity::moderation_case::Model, DbErr> {
        entity::moderation_case::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(self.user_id),
            moderator_id: ActiveValue::Set(self.moderator_id),
            action: ActiveValue::Set(self.action),
            reason: ActiveValue::Set(None),
            created_at: ActiveValue::Set(self.created_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_moderation_case(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<entity::moderation_case::Model, DbErr> {
    ModerationCaseFactory::new(db, guild_id).build().await
}
