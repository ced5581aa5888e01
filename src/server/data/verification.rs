use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter,
};

use crate::server::model::verification::{PendingVerification, VerificationKind};

/// Verifications issued by `/verify start` and not yet completed.
pub struct VerificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VerificationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a verification, replacing any pending one for the same member.
    pub async fn upsert_pending(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: VerificationKind,
        code: &str,
        verified_role_id: Option<u64>,
    ) -> Result<PendingVerification, DbErr> {
        let existing = self.find_entity(guild_id, user_id).await?;

        let model = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.kind = ActiveValue::Set(kind.as_str().to_string());
                active.code = ActiveValue::Set(code.to_string());
                active.verified_role_id = ActiveValue::Set(verified_role_id.map(|id| id.to_string()));
                active.created_at = ActiveValue::Set(Utc::now());
                active.update(self.db).await?
            }
            None => {
                entity::pending_verification::ActiveModel {
                    guild_id: ActiveValue::Set(guild_id.to_string()),
                    user_id: ActiveValue::Set(user_id.to_string()),
                    kind: ActiveValue::Set(kind.as_str().to_string()),
                    code: ActiveValue::Set(code.to_string()),
                    verified_role_id: ActiveValue::Set(verified_role_id.map(|id| id.to_string())),
                    created_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        PendingVerification::from_entity(model)
    }

    pub async fn find(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<PendingVerification>, DbErr> {
        self.find_entity(guild_id, user_id)
            .await?
            .map(PendingVerification::from_entity)
            .transpose()
    }

    /// Removes the pending verification, returning whether one existed.
    pub async fn delete(&self, guild_id: u64, user_id: u64) -> Result<bool, DbErr> {
        let result = entity::prelude::PendingVerification::delete_many()
            .filter(entity::pending_verification::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::pending_verification::Column::UserId.eq(user_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn find_entity(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<entity::pending_verification::Model>, DbErr> {
        entity::prelude::PendingVerification::find()
            .filter(entity::pending_verification::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::pending_verification::Column::UserId.eq(user_id.to_string()))
            .one(self.db)
            .await
    }
}
