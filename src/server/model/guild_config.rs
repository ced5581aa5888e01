//! Per-guild configuration and the typed updates the dashboard and `/config` may apply.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde_json::Value;

use super::{parse_id, parse_optional_id};
use crate::model::dashboard::GuildConfigDto;

pub const DEFAULT_LOCKDOWN_MINUTES: i32 = 30;
pub const MAX_LOCKDOWN_MINUTES: i32 = 24 * 60;

/// What happens to the executor of a detected nuke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punishment {
    None,
    StripRoles,
    Kick,
    Ban,
}

impl Punishment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StripRoles => "strip_roles",
            Self::Kick => "kick",
            Self::Ban => "ban",
        }
    }
}

impl FromStr for Punishment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "strip_roles" => Ok(Self::StripRoles),
            "kick" => Ok(Self::Kick),
            "ban" => Ok(Self::Ban),
            other => Err(format!("unknown punishment '{}'", other)),
        }
    }
}

impl fmt::Display for Punishment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toggleable guild features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AntiNuke,
    PhishingFilter,
    PresenceVerification,
    StatusRoles,
    ActivityAnalytics,
    AutoBackup,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::AntiNuke,
        Feature::PhishingFilter,
        Feature::PresenceVerification,
        Feature::StatusRoles,
        Feature::ActivityAnalytics,
        Feature::AutoBackup,
    ];

    /// Column / setting name.
    pub fn setting(&self) -> &'static str {
        match self {
            Self::AntiNuke => "anti_nuke_enabled",
            Self::PhishingFilter => "phishing_filter_enabled",
            Self::PresenceVerification => "presence_verification_enabled",
            Self::StatusRoles => "status_roles_enabled",
            Self::ActivityAnalytics => "activity_analytics_enabled",
            Self::AutoBackup => "auto_backup_enabled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AntiNuke => "Anti-nuke",
            Self::PhishingFilter => "Phishing filter",
            Self::PresenceVerification => "Presence verification",
            Self::StatusRoles => "Status roles",
            Self::ActivityAnalytics => "Activity analytics",
            Self::AutoBackup => "Automatic backups",
        }
    }

    pub fn from_setting(setting: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.setting() == setting)
    }
}

/// Roles the bot hands out automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRole {
    Gaming,
    Streaming,
    Verified,
}

impl ConfigRole {
    pub fn setting(&self) -> &'static str {
        match self {
            Self::Gaming => "gaming_role_id",
            Self::Streaming => "streaming_role_id",
            Self::Verified => "verified_role_id",
        }
    }

    pub fn from_setting(setting: &str) -> Option<Self> {
        [Self::Gaming, Self::Streaming, Self::Verified]
            .into_iter()
            .find(|r| r.setting() == setting)
    }
}

/// A single validated configuration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
    ModLogChannel(Option<u64>),
    Feature(Feature, bool),
    Role(ConfigRole, Option<u64>),
    LockdownMinutes(i32),
    Punishment(Punishment),
}

impl ConfigUpdate {
    /// Validates a `(setting, value)` pair coming from the dashboard.
    ///
    /// Only known settings are accepted and each value must have the setting's type.
    /// Booleans may also be sent as `0`/`1`, ids as strings or numbers, and `null` clears
    /// channel and role settings.
    pub fn parse(setting: &str, value: &Value) -> Result<Self, String> {
        if setting == "mod_log_channel_id" {
            return parse_snowflake(value).map(Self::ModLogChannel);
        }
        if let Some(feature) = Feature::from_setting(setting) {
            return parse_bool(value).map(|enabled| Self::Feature(feature, enabled));
        }
        if let Some(role) = ConfigRole::from_setting(setting) {
            return parse_snowflake(value).map(|id| Self::Role(role, id));
        }
        match setting {
            "lockdown_minutes" => {
                let minutes = value
                    .as_i64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                    .ok_or_else(|| "lockdown_minutes must be a number".to_string())?;
                if !(1..=MAX_LOCKDOWN_MINUTES as i64).contains(&minutes) {
                    return Err(format!(
                        "lockdown_minutes must be between 1 and {}",
                        MAX_LOCKDOWN_MINUTES
                    ));
                }
                Ok(Self::LockdownMinutes(minutes as i32))
            }
            "punishment" => value
                .as_str()
                .ok_or_else(|| "punishment must be a string".to_string())?
                .parse()
                .map(Self::Punishment),
            other => Err(format!("unknown setting '{}'", other)),
        }
    }
}

fn parse_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        _ => Err("value must be a boolean".to_string()),
    }
}

/// Discord ids are never zero, and serenity's id constructors panic on one.
fn parse_snowflake(value: &Value) -> Result<Option<u64>, String> {
    let id = match value {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };

    id.filter(|id| *id != 0)
        .map(Some)
        .ok_or_else(|| "value must be a Discord id".to_string())
}

/// Effective configuration of a guild.
///
/// Guilds without a stored row use [`GuildConfig::default_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub mod_log_channel_id: Option<u64>,
    pub anti_nuke_enabled: bool,
    pub phishing_filter_enabled: bool,
    pub presence_verification_enabled: bool,
    pub status_roles_enabled: bool,
    pub activity_analytics_enabled: bool,
    pub auto_backup_enabled: bool,
    pub gaming_role_id: Option<u64>,
    pub streaming_role_id: Option<u64>,
    pub verified_role_id: Option<u64>,
    pub lockdown_minutes: i32,
    pub punishment: Punishment,
    pub updated_at: DateTime<Utc>,
}

impl GuildConfig {
    pub fn default_for(guild_id: u64) -> Self {
        Self {
            guild_id,
            mod_log_channel_id: None,
            anti_nuke_enabled: true,
            phishing_filter_enabled: true,
            presence_verification_enabled: false,
            status_roles_enabled: false,
            activity_analytics_enabled: false,
            auto_backup_enabled: true,
            gaming_role_id: None,
            streaming_role_id: None,
            verified_role_id: None,
            lockdown_minutes: DEFAULT_LOCKDOWN_MINUTES,
            punishment: Punishment::StripRoles,
            updated_at: Utc::now(),
        }
    }

    pub fn from_entity(entity: entity::guild_config::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            mod_log_channel_id: parse_optional_id(
                "mod_log_channel_id",
                entity.mod_log_channel_id.as_deref(),
            )?,
            anti_nuke_enabled: entity.anti_nuke_enabled,
            phishing_filter_enabled: entity.phishing_filter_enabled,
            presence_verification_enabled: entity.presence_verification_enabled,
            status_roles_enabled: entity.status_roles_enabled,
            activity_analytics_enabled: entity.activity_analytics_enabled,
            auto_backup_enabled: entity.auto_backup_enabled,
            gaming_role_id: parse_optional_id("gaming_role_id", entity.gaming_role_id.as_deref())?,
            streaming_role_id: parse_optional_id(
                "streaming_role_id",
                entity.streaming_role_id.as_deref(),
            )?,
            verified_role_id: parse_optional_id(
                "verified_role_id",
                entity.verified_role_id.as_deref(),
            )?,
            lockdown_minutes: entity.lockdown_minutes,
            punishment: entity.punishment.parse().map_err(DbErr::Custom)?,
            updated_at: entity.updated_at,
        })
    }

    pub fn into_dto(self) -> GuildConfigDto {
        GuildConfigDto {
            mod_log_channel_id: self.mod_log_channel_id.map(|id| id.to_string()),
            anti_nuke_enabled: self.anti_nuke_enabled,
            phishing_filter_enabled: self.phishing_filter_enabled,
            presence_verification_enabled: self.presence_verification_enabled,
            status_roles_enabled: self.status_roles_enabled,
            activity_analytics_enabled: self.activity_analytics_enabled,
            auto_backup_enabled: self.auto_backup_enabled,
            gaming_role_id: self.gaming_role_id.map(|id| id.to_string()),
            streaming_role_id: self.streaming_role_id.map(|id| id.to_string()),
            verified_role_id: self.verified_role_id.map(|id| id.to_string()),
            lockdown_minutes: self.lockdown_minutes,
            punishment: self.punishment.to_string(),
        }
    }

    pub fn feature_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AntiNuke => self.anti_nuke_enabled,
            Feature::PhishingFilter => self.phishing_filter_enabled,
            Feature::PresenceVerification => self.presence_verification_enabled,
            Feature::StatusRoles => self.status_roles_enabled,
            Feature::ActivityAnalytics => self.activity_analytics_enabled,
            Feature::AutoBackup => self.auto_backup_enabled,
        }
    }

    pub fn role(&self, role: ConfigRole) -> Option<u64> {
        match role {
            ConfigRole::Gaming => self.gaming_role_id,
            ConfigRole::Streaming => self.streaming_role_id,
            ConfigRole::Verified => self.verified_role_id,
        }
    }

    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::ModLogChannel(channel) => self.mod_log_channel_id = channel,
            ConfigUpdate::Feature(feature, enabled) => {
                let flag = match feature {
                    Feature::AntiNuke => &mut self.anti_nuke_enabled,
                    Feature::PhishingFilter => &mut self.phishing_filter_enabled,
                    Feature::PresenceVerification => &mut self.presence_verification_enabled,
                    Feature::StatusRoles => &mut self.status_roles_enabled,
                    Feature::ActivityAnalytics => &mut self.activity_analytics_enabled,
                    Feature::AutoBackup => &mut self.auto_backup_enabled,
                };
                *flag = enabled;
            }
            ConfigUpdate::Role(role, id) => match role {
                ConfigRole::Gaming => self.gaming_role_id = id,
                ConfigRole::Streaming => self.streaming_role_id = id,
                ConfigRole::Verified => self.verified_role_id = id,
            },
            ConfigUpdate::LockdownMinutes(minutes) => self.lockdown_minutes = minutes,
            ConfigUpdate::Punishment(punishment) => self.punishment = punishment,
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_feature_toggles_from_bools_and_integers() {
        assert_eq!(
            ConfigUpdate::parse("anti_nuke_enabled", &json!(false)).unwrap(),
            ConfigUpdate::Feature(Feature::AntiNuke, false)
        );
        assert_eq!(
            ConfigUpdate::parse("status_roles_enabled", &json!(1)).unwrap(),
            ConfigUpdate::Feature(Feature::StatusRoles, true)
        );
    }

    #[test]
    fn rejects_unknown_settings() {
        assert!(ConfigUpdate::parse("guild_id", &json!("1")).is_err());
        assert!(ConfigUpdate::parse("server_id = 1; --", &json!(true)).is_err());
    }

    #[test]
    fn parses_and_clears_ids() {
        assert_eq!(
            ConfigUpdate::parse("mod_log_channel_id", &json!("123456789012345678")).unwrap(),
            ConfigUpdate::ModLogChannel(Some(123456789012345678))
        );
        assert_eq!(
            ConfigUpdate::parse("verified_role_id", &json!(null)).unwrap(),
            ConfigUpdate::Role(ConfigRole::Verified, None)
        );
        assert!(ConfigUpdate::parse("gaming_role_id", &json!("abc")).is_err());
    }

    #[test]
    fn rejects_zero_ids() {
        assert!(ConfigUpdate::parse("mod_log_channel_id", &json!("0")).is_err());
        assert!(ConfigUpdate::parse("mod_log_channel_id", &json!(0)).is_err());
        assert!(ConfigUpdate::parse("verified_role_id", &json!("000")).is_err());
    }

    #[test]
    fn bounds_lockdown_minutes() {
        assert!(ConfigUpdate::parse("lockdown_minutes", &json!(0)).is_err());
        assert!(ConfigUpdate::parse("lockdown_minutes", &json!(5000)).is_err());
        assert_eq!(
            ConfigUpdate::parse("lockdown_minutes", &json!("45")).unwrap(),
            ConfigUpdate::LockdownMinutes(45)
        );
    }

    #[test]
    fn applies_updates() {
        let mut config = GuildConfig::default_for(1);

        config.apply(ConfigUpdate::Feature(Feature::AutoBackup, false));
        config.apply(ConfigUpdate::Punishment(Punishment::Ban));
        config.apply(ConfigUpdate::Role(ConfigRole::Gaming, Some(9)));

        assert!(!config.feature_enabled(Feature::AutoBackup));
        assert_eq!(config.punishment, Punishment::Ban);
        assert_eq!(config.role(ConfigRole::Gaming), Some(9));
    }

    #[test]
    fn dto_carries_ids_as_strings() {
        let mut config = GuildConfig::default_for(1);
        config.mod_log_channel_id = Some(123456789012345678);

        let dto = config.into_dto();

        assert_eq!(dto.mod_log_channel_id.as_deref(), Some("123456789012345678"));
        assert_eq!(dto.verified_role_id, None);
        assert_eq!(dto.punishment, "strip_roles");
    }
}
