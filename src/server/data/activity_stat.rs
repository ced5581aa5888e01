use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::server::model::activity::ActivityStat;

pub struct ActivityStatRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ActivityStatRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds one observation of `status` during `hour` (0-23, UTC).
    pub async fn increment(
        &self,
        guild_id: u64,
        hour: u32,
        status: &str,
    ) -> Result<ActivityStat, DbErr> {
        let existing = entity::prelude::ActivityStat::find()
            .filter(entity::activity_stat::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::activity_stat::Column::Hour.eq(hour as i32))
            .filter(entity::activity_stat::Column::Status.eq(status))
            .one(self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let count = model.count;
                let mut active = model.into_active_model();
                active.count = ActiveValue::Set(count + 1);
                active.update(self.db).await?
            }
            None => {
                entity::activity_stat::ActiveModel {
                    guild_id: ActiveValue::Set(guild_id.to_string()),
                    hour: ActiveValue::Set(hour as i32),
                    status: ActiveValue::Set(status.to_string()),
                    count: ActiveValue::Set(1),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        ActivityStat::from_entity(model)
    }

    pub async fn get_by_guild(&self, guild_id: u64) -> Result<Vec<ActivityStat>, DbErr> {
        entity::prelude::ActivityStat::find()
            .filter(entity::activity_stat::Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(entity::activity_stat::Column::Hour)
            .all(self.db)
            .await?
            .into_iter()
            .map(ActivityStat::from_entity)
            .collect()
    }
}
