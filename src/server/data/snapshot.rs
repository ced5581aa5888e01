use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::model::snapshot::{GuildSnapshot, SnapshotData};

pub struct SnapshotRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SnapshotRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        guild_id: u64,
        kind: &str,
        reason: &str,
        data: &SnapshotData,
    ) -> Result<GuildSnapshot, DbErr> {
        let data = serde_json::to_string(data)
            .map_err(|e| DbErr::Custom(format!("Failed to serialize snapshot: {}", e)))?;

        let entity = entity::guild_snapshot::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            kind: ActiveValue::Set(kind.to_string()),
            reason: ActiveValue::Set(reason.to_string()),
            data: ActiveValue::Set(data),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        GuildSnapshot::from_entity(entity)
    }

    pub async fn get_latest(&self, guild_id: u64) -> Result<Option<GuildSnapshot>, DbErr> {
        entity::prelude::GuildSnapshot::find()
            .filter(entity::guild_snapshot::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::guild_snapshot::Column::CreatedAt)
            .one(self.db)
            .await?
            .map(GuildSnapshot::from_entity)
            .transpose()
    }

    /// The `limit` newest snapshots of a guild.
    pub async fn get_by_guild(&self, guild_id: u64, limit: u64) -> Result<Vec<GuildSnapshot>, DbErr> {
        entity::prelude::GuildSnapshot::find()
            .filter(entity::guild_snapshot::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::guild_snapshot::Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(GuildSnapshot::from_entity)
            .collect()
    }
}
