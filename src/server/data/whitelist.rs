use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::antinuke::WhitelistEntry;

/// Users whose administrative actions the anti-nuke detector ignores.
pub struct WhitelistRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WhitelistRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a user to the guild's whitelist.
    ///
    /// # Returns
    /// - `Ok(Some(entry))` - User was added
    /// - `Ok(None)` - User was already whitelisted
    pub async fn add(
        &self,
        guild_id: u64,
        user_id: u64,
        added_by: u64,
    ) -> Result<Option<WhitelistEntry>, DbErr> {
        if self.contains(guild_id, user_id).await? {
            return Ok(None);
        }

        let entity = entity::antinuke_whitelist::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            added_by: ActiveValue::Set(added_by.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        WhitelistEntry::from_entity(entity).map(Some)
    }

    /// Removes a user from the whitelist, returning whether a row was deleted.
    pub async fn remove(&self, guild_id: u64, user_id: u64) -> Result<bool, DbErr> {
        let result = entity::prelude::AntiNukeWhitelist::delete_many()
            .filter(entity::antinuke_whitelist::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::antinuke_whitelist::Column::UserId.eq(user_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn contains(&self, guild_id: u64, user_id: u64) -> Result<bool, DbErr> {
        let entry = entity::prelude::AntiNukeWhitelist::find()
            .filter(entity::antinuke_whitelist::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::antinuke_whitelist::Column::UserId.eq(user_id.to_string()))
            .one(self.db)
            .await?;

        Ok(entry.is_some())
    }

    pub async fn get_by_guild(&self, guild_id: u64) -> Result<Vec<WhitelistEntry>, DbErr> {
        entity::prelude::AntiNukeWhitelist::find()
            .filter(entity::antinuke_whitelist::Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(entity::antinuke_whitelist::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(WhitelistEntry::from_entity)
            .collect()
    }
}
