use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::model::threat::{CreateThreatParam, Threat};

/// Threat intelligence store.
pub struct ThreatRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ThreatRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateThreatParam) -> Result<Threat, DbErr> {
        let entity = entity::threat::ActiveModel {
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            user_id: ActiveValue::Set(param.user_id.map(|id| id.to_string())),
            threat_type: ActiveValue::Set(param.threat_type),
            severity: ActiveValue::Set(param.severity.as_str().to_string()),
            details: ActiveValue::Set(param.details.to_string()),
            reported_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Threat::from_entity(entity)
    }

    /// Threats reported in a guild at or after `since`, newest first.
    pub async fn get_since(
        &self,
        guild_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Threat>, DbErr> {
        entity::prelude::Threat::find()
            .filter(entity::threat::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::threat::Column::ReportedAt.gte(since))
            .order_by_desc(entity::threat::Column::ReportedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Threat::from_entity)
            .collect()
    }

    /// The `limit` most recent threats in a guild.
    pub async fn get_recent(&self, guild_id: u64, limit: u64) -> Result<Vec<Threat>, DbErr> {
        entity::prelude::Threat::find()
            .filter(entity::threat::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::threat::Column::ReportedAt)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(Threat::from_entity)
            .collect()
    }
}
