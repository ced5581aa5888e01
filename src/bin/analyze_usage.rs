//! Prints a command usage report for the last seven days.
//!
//! Reads `DATABASE_URL` (from `.env` when present) and needs no Discord credentials.

use chrono::Utc;

use nexus::server::{
    config::database_url_from_env, error::AppError, service::analytics::weekly_report, startup,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let db = startup::connect_to_database(&database_url_from_env()?).await?;
    let report = weekly_report(&db, Utc::now()).await?;

    println!("{}", report.render());

    Ok(())
}
