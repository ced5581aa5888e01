use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use super::parse_id;

/// A moderation action taken through the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationCase {
    pub id: i32,
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    /// `ban`, `kick`, `role_add`, `role_remove`, ...
    pub action: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ModerationCase {
    pub fn from_entity(entity: entity::moderation_case::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            user_id: parse_id("user_id", &entity.user_id)?,
            moderator_id: parse_id("moderator_id", &entity.moderator_id)?,
            action: entity.action,
            reason: entity.reason,
            created_at: entity.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateCaseParam {
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub action: String,
    pub reason: Option<String>,
}
