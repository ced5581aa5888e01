use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::usage::{CommandUsage, CreateUsageParam};

pub struct CommandUsageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CommandUsageRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateUsageParam) -> Result<CommandUsage, DbErr> {
        let entity = entity::command_usage::ActiveModel {
            command: ActiveValue::Set(param.command),
            guild_id: ActiveValue::Set(param.guild_id.map(|id| id.to_string())),
            user_id: ActiveValue::Set(param.user_id.to_string()),
            duration_ms: ActiveValue::Set(param.duration_ms as i64),
            success: ActiveValue::Set(param.success),
            used_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        CommandUsage::from_entity(entity)
    }

    /// Every invocation at or after `since`, oldest first.
    pub async fn get_since(&self, since: DateTime<Utc>) -> Result<Vec<CommandUsage>, DbErr> {
        entity::prelude::CommandUsage::find()
            .filter(entity::command_usage::Column::UsedAt.gte(since))
            .order_by_asc(entity::command_usage::Column::UsedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(CommandUsage::from_entity)
            .collect()
    }
}
