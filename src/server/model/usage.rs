use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use super::{parse_id, parse_optional_id};

/// One slash command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandUsage {
    pub command: String,
    pub guild_id: Option<u64>,
    pub user_id: u64,
    pub duration_ms: u64,
    pub success: bool,
    pub used_at: DateTime<Utc>,
}

impl CommandUsage {
    pub fn from_entity(entity: entity::command_usage::Model) -> Result<Self, DbErr> {
        Ok(Self {
            command: entity.command,
            guild_id: parse_optional_id("guild_id", entity.guild_id.as_deref())?,
            user_id: parse_id("user_id", &entity.user_id)?,
            duration_ms: entity.duration_ms.max(0) as u64,
            success: entity.success,
            used_at: entity.used_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUsageParam {
    pub command: String,
    pub guild_id: Option<u64>,
    pub user_id: u64,
    pub duration_ms: u64,
    pub success: bool,
}
