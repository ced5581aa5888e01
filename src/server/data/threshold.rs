use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter,
};

use crate::server::model::antinuke::{ActionKind, Threshold};

/// Per-guild overrides of the default anti-nuke thresholds.
pub struct ThresholdRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ThresholdRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the overrides stored for a guild keyed by action kind.
    ///
    /// Kinds without an override are absent; callers fall back to
    /// [`ActionKind::default_threshold`].
    pub async fn get_by_guild(
        &self,
        guild_id: u64,
    ) -> Result<HashMap<ActionKind, Threshold>, DbErr> {
        entity::prelude::AntiNukeThreshold::find()
            .filter(entity::antinuke_threshold::Column::GuildId.eq(guild_id.to_string()))
            .all(self.db)
            .await?
            .iter()
            .map(Threshold::from_entity)
            .collect()
    }

    /// Effective threshold for one kind.
    pub async fn resolve(&self, guild_id: u64, kind: ActionKind) -> Result<Threshold, DbErr> {
        let stored = entity::prelude::AntiNukeThreshold::find()
            .filter(entity::antinuke_threshold::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::antinuke_threshold::Column::Action.eq(kind.as_str()))
            .one(self.db)
            .await?;

        match stored {
            Some(model) => Threshold::from_entity(&model).map(|(_, threshold)| threshold),
            None => Ok(kind.default_threshold()),
        }
    }

    /// Creates or replaces the override for one kind.
    pub async fn set(
        &self,
        guild_id: u64,
        kind: ActionKind,
        threshold: Threshold,
    ) -> Result<Threshold, DbErr> {
        let existing = entity::prelude::AntiNukeThreshold::find()
            .filter(entity::antinuke_threshold::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::antinuke_threshold::Column::Action.eq(kind.as_str()))
            .one(self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.max_actions = ActiveValue::Set(threshold.limit as i32);
                active.window_seconds = ActiveValue::Set(threshold.window_seconds() as i32);
                active.update(self.db).await?
            }
            None => {
                entity::antinuke_threshold::ActiveModel {
                    guild_id: ActiveValue::Set(guild_id.to_string()),
                    action: ActiveValue::Set(kind.as_str().to_string()),
                    max_actions: ActiveValue::Set(threshold.limit as i32),
                    window_seconds: ActiveValue::Set(threshold.window_seconds() as i32),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Threshold::from_entity(&model).map(|(_, threshold)| threshold)
    }
}
