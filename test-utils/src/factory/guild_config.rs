//! Factory for `guild_config` rows.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Builder for guild configuration rows. Defaults mirror the migration defaults.
pub struct GuildConfigFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    mod_log_channel_id: Option<String>,
    anti_nuke_enabled: bool,
    phishing_filter_enabled: bool,
    presence_verification_enabled: bool,
    status_roles_enabled: bool,
    activity_analytics_enabled: bool,
    auto_backup_enabled: bool,
    lockdown_minutes: i32,
    punishment: String,
}

impl<'a> GuildConfigFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, guild_id: &str) -> Self {
        Self {
            db,
            guild_id: guild_id.to_string(),
            mod_log_channel_id: None,
            anti_nuke_enabled: true,
            phishing_filter_enabled: true,
            presence_verification_enabled: false,
            status_roles_enabled: false,
            activity_analytics_enabled: false,
            auto_backup_enabled: true,
            lockdown_minutes: 30,
            punishment: "strip_roles".to_string(),
        }
    }

    pub fn mod_log_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.mod_log_channel_id = Some(channel_id.into());
        self
    }

    pub fn anti_nuke_enabled(mut self, enabled: bool) -> Self {
        self.anti_nuke_enabled = enabled;
        self
    }

    pub fn auto_backup_enabled(mut self, enabled: bool) -> Self {
        self.auto_backup_enabled = enabled;
        self
    }

    pub fn presence_features(mut self, enabled: bool) -> Self {
        self.presence_verification_enabled = enabled;
        self.status_roles_enabled = enabled;
        self.activity_analytics_enabled = enabled;
        self
    }

    pub fn lockdown_minutes(mut self, minutes: i32) -> Self {
        self.lockdown_minutes = minutes;
        self
    }

    pub fn punishment(mut self, punishment: impl Into<String>) -> Self {
        self.punishment = punishment.into();
        self
    }

    pub async fn build(self) -> Result<entity::guild_config::Model, DbErr> {
        entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            mod_log_channel_id: ActiveValue::Set(self.mod_log_channel_id),
            anti_nuke_enabled: ActiveValue::Set(self.anti_nuke_enabled),
            phishing_filter_enabled: ActiveValue::Set(self.phishing_filter_enabled),
            presence_verification_enabled: ActiveValue::Set(self.presence_verification_enabled),
            status_roles_enabled: ActiveValue::Set(self.status_roles_enabled),
            activity_analytics_enabled: ActiveValue::Set(self.activity_analytics_enabled),
            auto_backup_enabled: ActiveValue::Set(self.auto_backup_enabled),
            gaming_role_id: ActiveValue::Set(None),
            streaming_role_id: ActiveValue::Set(None),
            verified_role_id: ActiveValue::Set(None),
            lockdown_minutes: ActiveValue::Set(self.lockdown_minutes),
            punishment: ActiveValue::Set(self.punishment),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a default configuration for an existing guild.
pub async fn create_guild_config(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<entity::guild_config::Model, DbErr> {
    GuildConfigFactory::new(db, guild_id).build().await
}
