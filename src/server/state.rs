//! Shared state for the dashboard handlers and the bot's event handler.
//!
//! Both structs are built once in `main` and cloned into their consumers. Every field is a
//! pool, an `Arc`, or a service whose clones share the same underlying state, so the
//! dashboard and the bot observe the same guild configuration cache and performance monitor.

use std::{path::PathBuf, sync::Arc};

use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    Client, EmptyExtraTokenFields, EndpointNotSet, EndpointSet, RevocationErrorResponseType,
    StandardErrorResponse, StandardRevocableToken, StandardTokenIntrospectionResponse,
    StandardTokenResponse,
};
use sea_orm::DatabaseConnection;
use serenity::{cache::Cache, gateway::ShardManager, http::Http};

use crate::server::service::{
    alert::AlertService, antinuke::tracker::ActionTracker, guild_config::GuildConfigService,
    integrity::IntegrityGuard, lifecycle::LifecycleTracker, performance::PerformanceMonitor,
    presence::PresenceTracker,
};

/// OAuth2 client configured for Discord's authorize and token endpoints.
pub(crate) type OAuth2Client = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Gateway handles taken from the serenity client before it starts.
#[derive(Clone)]
pub struct DiscordHandles {
    pub http: Arc<Http>,
    pub cache: Arc<Cache>,
    pub shard_manager: Arc<ShardManager>,
}

/// Dashboard state, extracted by axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,

    /// Client for Discord's OAuth and REST endpoints. Redirects are disabled.
    pub http_client: reqwest::Client,

    pub oauth_client: OAuth2Client,

    pub discord: DiscordHandles,

    pub configs: GuildConfigService,

    pub performance: PerformanceMonitor,

    /// Directory holding the dashboard's HTML, script and style files.
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        http_client: reqwest::Client,
        oauth_client: OAuth2Client,
        discord: DiscordHandles,
        configs: GuildConfigService,
        performance: PerformanceMonitor,
        public_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            http_client,
            oauth_client,
            discord,
            configs,
            performance,
            public_dir,
        }
    }
}

/// State shared by every event and command handler.
#[derive(Clone)]
pub struct BotState {
    pub db: DatabaseConnection,
    pub configs: GuildConfigService,
    pub performance: PerformanceMonitor,
    pub alerts: AlertService,
    pub integrity: IntegrityGuard,
    pub tracker: ActionTracker,
    pub lifecycle: LifecycleTracker,
    pub presence: PresenceTracker,
    /// Bot owner, allowed to run owner-only commands.
    pub owner_id: Option<u64>,
}
