use std::collections::HashMap;

use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use sea_orm::DatabaseConnection;
use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::server::{
    config::Config,
    error::{config::ConfigError, AppError},
    service::{
        alert::AlertService,
        antinuke::tracker::ActionTracker,
        bot_list::{BotList, BotListService},
        guild_config::GuildConfigService,
        integrity::IntegrityGuard,
        lifecycle::LifecycleTracker,
        performance::PerformanceMonitor,
        presence::PresenceTracker,
    },
    state::{BotState, OAuth2Client},
};

/// Connects to the Sqlite database and runs pending migrations.
///
/// Must complete before anything touches the database.
pub async fn connect_to_database(database_url: &str) -> Result<DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Session layer backed by the same Sqlite pool, with a 7 day inactivity expiry.
pub async fn connect_to_session(
    db: &DatabaseConnection,
) -> Result<SessionManagerLayer<SqliteStore>, AppError> {
    let pool = db.get_sqlite_connection_pool();
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    Ok(SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7))))
}

/// HTTP client used for OAuth, webhooks and bot lists.
///
/// Redirects are disabled so a crafted webhook or API response cannot bounce requests to
/// other hosts.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    Ok(reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

pub fn setup_oauth_client(config: &Config) -> Result<OAuth2Client, AppError> {
    let auth_url =
        AuthUrl::new(config.discord_auth_url.clone()).map_err(ConfigError::InvalidUrl)?;
    let token_url =
        TokenUrl::new(config.discord_token_url.clone()).map_err(ConfigError::InvalidUrl)?;
    let redirect_url =
        RedirectUrl::new(config.discord_redirect_url.clone()).map_err(ConfigError::InvalidUrl)?;

    Ok(BasicClient::new(ClientId::new(config.discord_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.discord_client_secret.clone()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

/// Builds the bot's shared state, compiling the phishing patterns once.
pub fn build_bot_state(
    config: &Config,
    db: DatabaseConnection,
    http_client: reqwest::Client,
    configs: GuildConfigService,
    performance: PerformanceMonitor,
) -> Result<BotState, AppError> {
    let integrity = IntegrityGuard::new()
        .map_err(|e| AppError::InternalError(format!("Invalid phishing pattern: {}", e)))?;

    Ok(BotState {
        db,
        configs,
        performance,
        alerts: AlertService::new(
            http_client,
            config.admin_webhook_url.clone(),
            config.phishing_webhook_url.clone(),
        ),
        integrity,
        tracker: ActionTracker::new(),
        lifecycle: LifecycleTracker::new(),
        presence: PresenceTracker::default(),
        owner_id: config.owner_id,
    })
}

/// Bot-list client holding a token for each configured list.
pub fn setup_bot_lists(config: &Config, http_client: reqwest::Client) -> BotListService {
    let tokens = [
        (BotList::TopGg, &config.topgg_token),
        (BotList::DiscordBotList, &config.discordbotlist_token),
        (BotList::VoidBots, &config.voidbots_token),
    ]
    .into_iter()
    .filter_map(|(list, token)| token.clone().map(|token| (list, token)))
    .collect::<HashMap<_, _>>();

    BotListService::new(http_client, tokens)
}
