use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The logged-in dashboard user, as stored in the session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DashboardUserDto {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
    /// Guild ids where the user is owner or has ADMINISTRATOR.
    pub manageable_guilds: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummaryDto {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub member_count: u64,
    pub owner_id: String,
    pub has_bot: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetailDto {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub member_count: u64,
    pub owner_id: String,
    pub locked_down: bool,
    pub config: GuildConfigDto,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct GuildConfigDto {
    pub mod_log_channel_id: Option<String>,
    pub anti_nuke_enabled: bool,
    pub phishing_filter_enabled: bool,
    pub presence_verification_enabled: bool,
    pub status_roles_enabled: bool,
    pub activity_analytics_enabled: bool,
    pub auto_backup_enabled: bool,
    pub gaming_role_id: Option<String>,
    pub streaming_role_id: Option<String>,
    pub verified_role_id: Option<String>,
    pub lockdown_minutes: i32,
    pub punishment: String,
}

/// Body of `POST /api/server/{id}/config`.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct ConfigUpdateDto {
    pub setting: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct BotStatsDto {
    pub servers: usize,
    pub users: u64,
    /// Seconds since the process started.
    pub uptime: u64,
    /// Average shard heartbeat latency in milliseconds, when known.
    pub ping: Option<u64>,
    /// Resident memory in MiB.
    pub memory: u64,
}
