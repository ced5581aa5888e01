use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::moderation::{CreateCaseParam, ModerationCase};

pub struct ModerationCaseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModerationCaseRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateCaseParam) -> Result<ModerationCase, DbErr> {
        let entity = entity::moderation_case::ActiveModel {
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            user_id: ActiveValue::Set(param.user_id.to_string()),
            moderator_id: ActiveValue::Set(param.moderator_id.to_string()),
            action: ActiveValue::Set(param.action),
            reason: ActiveValue::Set(param.reason),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        ModerationCase::from_entity(entity)
    }

    /// Cases opened in a guild at or after `since`, newest first.
    pub async fn get_since(
        &self,
        guild_id: u64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ModerationCase>, DbErr> {
        entity::prelude::ModerationCase::find()
            .filter(entity::moderation_case::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::moderation_case::Column::CreatedAt.gte(since))
            .order_by_desc(entity::moderation_case::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(ModerationCase::from_entity)
            .collect()
    }
}
