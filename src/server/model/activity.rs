use sea_orm::DbErr;

use super::parse_id;

/// Aggregate presence count for one guild, hour of day and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStat {
    pub guild_id: u64,
    pub hour: u32,
    pub status: String,
    pub count: u64,
}

impl ActivityStat {
    pub fn from_entity(entity: entity::activity_stat::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            hour: entity.hour.clamp(0, 23) as u32,
            status: entity.status,
            count: entity.count.max(0) as u64,
        })
    }
}
