use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::antinuke::LockdownState;

pub struct LockdownRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LockdownRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a lockdown for a guild.
    ///
    /// Fails with a unique constraint error if the guild is already locked down, and with a
    /// foreign key error if the guild has no row.
    pub async fn create(
        &self,
        guild_id: u64,
        reason: &str,
        previous_permissions: u64,
        expires_at: DateTime<Utc>,
    ) -> Result<LockdownState, DbErr> {
        let entity = entity::lockdown::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            reason: ActiveValue::Set(reason.to_string()),
            previous_permissions: ActiveValue::Set(previous_permissions as i64),
            locked_at: ActiveValue::Set(Utc::now()),
            expires_at: ActiveValue::Set(expires_at),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        LockdownState::from_entity(entity)
    }

    pub async fn find_by_guild_id(&self, guild_id: u64) -> Result<Option<LockdownState>, DbErr> {
        entity::prelude::Lockdown::find()
            .filter(entity::lockdown::Column::GuildId.eq(guild_id.to_string()))
            .one(self.db)
            .await?
            .map(LockdownState::from_entity)
            .transpose()
    }

    /// Lockdowns whose `expires_at` is at or before `now`.
    pub async fn get_expired(&self, now: DateTime<Utc>) -> Result<Vec<LockdownState>, DbErr> {
        entity::prelude::Lockdown::find()
            .filter(entity::lockdown::Column::ExpiresAt.lte(now))
            .all(self.db)
            .await?
            .into_iter()
            .map(LockdownState::from_entity)
            .collect()
    }

    /// Returns whether a lockdown row was removed.
    pub async fn delete(&self, guild_id: u64) -> Result<bool, DbErr> {
        let result = entity::prelude::Lockdown::delete_many()
            .filter(entity::lockdown::Column::GuildId.eq(guild_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
