use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::server::model::guild_config::GuildConfig;

pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_guild_id(&self, guild_id: u64) -> Result<Option<GuildConfig>, DbErr> {
        entity::prelude::GuildConfig::find()
            .filter(entity::guild_config::Column::GuildId.eq(guild_id.to_string()))
            .one(self.db)
            .await?
            .map(GuildConfig::from_entity)
            .transpose()
    }

    /// Returns the stored configuration, or the defaults when the guild has none yet.
    pub async fn get_or_default(&self, guild_id: u64) -> Result<GuildConfig, DbErr> {
        Ok(self
            .find_by_guild_id(guild_id)
            .await?
            .unwrap_or_else(|| GuildConfig::default_for(guild_id)))
    }

    /// Writes every column of `config`, creating the row if needed.
    pub async fn save(&self, config: &GuildConfig) -> Result<GuildConfig, DbErr> {
        use entity::guild_config::Column;

        let entity = entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(config.guild_id.to_string()),
            mod_log_channel_id: ActiveValue::Set(
                config.mod_log_channel_id.map(|id| id.to_string()),
            ),
            anti_nuke_enabled: ActiveValue::Set(config.anti_nuke_enabled),
            phishing_filter_enabled: ActiveValue::Set(config.phishing_filter_enabled),
            presence_verification_enabled: ActiveValue::Set(config.presence_verification_enabled),
            status_roles_enabled: ActiveValue::Set(config.status_roles_enabled),
            activity_analytics_enabled: ActiveValue::Set(config.activity_analytics_enabled),
            auto_backup_enabled: ActiveValue::Set(config.auto_backup_enabled),
            gaming_role_id: ActiveValue::Set(config.gaming_role_id.map(|id| id.to_string())),
            streaming_role_id: ActiveValue::Set(config.streaming_role_id.map(|id| id.to_string())),
            verified_role_id: ActiveValue::Set(config.verified_role_id.map(|id| id.to_string())),
            lockdown_minutes: ActiveValue::Set(config.lockdown_minutes),
            punishment: ActiveValue::Set(config.punishment.as_str().to_string()),
            updated_at: ActiveValue::Set(config.updated_at),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([
                    Column::ModLogChannelId,
                    Column::AntiNukeEnabled,
                    Column::PhishingFilterEnabled,
                    Column::PresenceVerificationEnabled,
                    Column::StatusRolesEnabled,
                    Column::ActivityAnalyticsEnabled,
                    Column::AutoBackupEnabled,
                    Column::GamingRoleId,
                    Column::StreamingRoleId,
                    Column::VerifiedRoleId,
                    Column::LockdownMinutes,
                    Column::Punishment,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        GuildConfig::from_entity(entity)
    }
}
