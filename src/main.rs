use std::net::SocketAddr;

use nexus::server::{
    bot,
    config::Config,
    error::AppError,
    router,
    scheduler::{self, SchedulerContext},
    service::{guild_config::GuildConfigService, performance::PerformanceMonitor},
    startup,
    state::AppState,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "nexus=info,serenity=warn";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config.database_url).await?;
    let session = startup::connect_to_session(&db).await?;
    let http_client = startup::setup_reqwest_client()?;
    let oauth_client = startup::setup_oauth_client(&config)?;

    let performance = PerformanceMonitor::new();
    let configs = GuildConfigService::new(db.clone(), performance.clone());
    let bot_state = startup::build_bot_state(
        &config,
        db.clone(),
        http_client.clone(),
        configs.clone(),
        performance.clone(),
    )?;
    let tracker = bot_state.tracker.clone();

    tracing::info!("Starting Nexus");

    let (bot_client, discord) = bot::start::init_bot(&config, bot_state).await?;

    let shard_mode = config.shard_mode;
    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client, shard_mode).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let mut scheduler = scheduler::start_scheduler(SchedulerContext {
        db: db.clone(),
        discord: discord.clone(),
        configs: configs.clone(),
        performance: performance.clone(),
        tracker,
        bot_lists: startup::setup_bot_lists(&config, http_client.clone()),
    })
    .await?;

    let app_state = AppState::new(
        db,
        http_client,
        oauth_client,
        discord.clone(),
        configs,
        performance,
        config.dashboard_public_dir.clone(),
    );
    let app = router::router(&app_state)?
        .with_state(app_state)
        .layer(session);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.dashboard_port)).await?;
    tracing::info!("Dashboard listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down");
    discord.shard_manager.shutdown_all().await;
    if let Err(e) = scheduler.shutdown().await {
        tracing::error!("Failed to stop scheduler: {}", e);
    }

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
