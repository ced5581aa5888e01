use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use super::parse_id;

/// A guild the bot is or was a member of.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscordGuild {
    pub guild_id: u64,
    pub name: String,
    pub icon_hash: Option<String>,
    pub owner_id: u64,
    pub member_count: u64,
    pub last_seen_at: DateTime<Utc>,
}

impl DiscordGuild {
    pub fn from_entity(entity: entity::discord_guild::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            name: entity.name,
            icon_hash: entity.icon_hash,
            owner_id: parse_id("owner_id", &entity.owner_id)?,
            member_count: entity.member_count.max(0) as u64,
            last_seen_at: entity.last_seen_at,
        })
    }

    /// CDN url of the guild icon, if it has one.
    pub fn icon_url(&self) -> Option<String> {
        self.icon_hash.as_ref().map(|hash| {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            format!(
                "https://cdn.discordapp.com/icons/{}/{}.{}",
                self.guild_id, hash, ext
            )
        })
    }
}
