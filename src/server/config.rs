use std::path::PathBuf;

use crate::server::error::{config::ConfigError, AppError};

const DISCORD_AUTH_URL: &str = "https://discord.com/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

const DEFAULT_DASHBOARD_PORT: u16 = 3000;
const DEFAULT_PUBLIC_DIR: &str = "dashboard/public";

/// How the gateway connection is split into shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardMode {
    /// Use the shard count Discord recommends.
    Auto,
    Fixed(u32),
}

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,
    pub discord_client_id: String,
    pub discord_client_secret: String,
    pub discord_redirect_url: String,

    pub discord_auth_url: String,
    pub discord_token_url: String,

    pub dashboard_port: u16,
    pub dashboard_public_dir: PathBuf,

    pub owner_id: Option<u64>,

    pub admin_webhook_url: Option<String>,
    pub phishing_webhook_url: Option<String>,

    pub topgg_token: Option<String>,
    pub discordbotlist_token: Option<String>,
    pub voidbots_token: Option<String>,

    pub shard_mode: ShardMode,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_client_id: required("DISCORD_CLIENT_ID")?,
            discord_client_secret: required("DISCORD_CLIENT_SECRET")?,
            discord_redirect_url: required("DISCORD_REDIRECT_URL")?,
            discord_auth_url: DISCORD_AUTH_URL.to_string(),
            discord_token_url: DISCORD_TOKEN_URL.to_string(),
            dashboard_port: parsed("DASHBOARD_PORT")?.unwrap_or(DEFAULT_DASHBOARD_PORT),
            dashboard_public_dir: optional("DASHBOARD_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR)),
            owner_id: parsed("OWNER_ID")?,
            admin_webhook_url: optional("ADMIN_WEBHOOK_URL"),
            phishing_webhook_url: optional("PHISHING_ALERT_WEBHOOK"),
            topgg_token: optional("TOPGG_TOKEN"),
            discordbotlist_token: optional("DISCORDBOTLIST_TOKEN"),
            voidbots_token: optional("VOIDBOTS_TOKEN"),
            shard_mode: ShardMode::parse(optional("SHARD_COUNT").as_deref())?,
        })
    }
}

impl ShardMode {
    fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            None | Some("auto") | Some("") => Ok(Self::Auto),
            Some(count) => count
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Fixed)
                .ok_or_else(|| ConfigError::InvalidEnvVar {
                    name: "SHARD_COUNT".to_string(),
                    value: count.to_string(),
                }),
        }
    }
}

/// Only the database location, for tools that never talk to Discord.
pub fn database_url_from_env() -> Result<String, AppError> {
    Ok(required("DATABASE_URL")?)
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Reads an optional variable, treating an empty value as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    optional(name)
        .map(|value| {
            value.parse::<T>().map_err(|_| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_mode_defaults_to_auto() {
        assert_eq!(ShardMode::parse(None).unwrap(), ShardMode::Auto);
        assert_eq!(ShardMode::parse(Some("auto")).unwrap(), ShardMode::Auto);
    }

    #[test]
    fn shard_mode_accepts_fixed_count() {
        assert_eq!(ShardMode::parse(Some("4")).unwrap(), ShardMode::Fixed(4));
    }

    #[test]
    fn shard_mode_rejects_zero_and_garbage() {
        assert!(ShardMode::parse(Some("0")).is_err());
        assert!(ShardMode::parse(Some("many")).is_err());
    }
}
