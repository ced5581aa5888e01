use axum::{routing::get, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{
    controller::{
        auth::{self, callback, login, logout, AUTH_TAG},
        page::{dashboard, index},
        server::{self, SERVER_TAG},
        stats::{self, STATS_TAG},
    },
    error::AppError,
    state::AppState,
};

/// Requests allowed per client IP on the JSON API: one token every 2 seconds, bursts of 30.
const API_REPLENISH_SECONDS: u64 = 2;
const API_BURST_SIZE: u32 = 30;

#[derive(OpenApi)]
#[openapi(
    info(title = "Nexus dashboard API"),
    tags(
        (name = AUTH_TAG, description = "Dashboard login"),
        (name = SERVER_TAG, description = "Server details and configuration"),
        (name = STATS_TAG, description = "Bot statistics")
    )
)]
struct ApiDoc;

/// Builds the dashboard router.
///
/// Pages and OAuth routes sit at the root, the JSON API under `/api` behind a per-IP rate
/// limit, and everything else falls through to the static files in `state.public_dir`.
pub fn router(state: &AppState) -> Result<Router<AppState>, AppError> {
    let governor_config = GovernorConfigBuilder::default()
        .per_second(API_REPLENISH_SECONDS)
        .burst_size(API_BURST_SIZE)
        .finish()
        .ok_or_else(|| AppError::InternalError("Invalid API rate limit".to_string()))?;

    let (api, openapi) = OpenApiRouter::<AppState>::with_openapi(ApiDoc::openapi())
        .routes(routes!(auth::get_user))
        .routes(routes!(server::get_servers))
        .routes(routes!(server::get_server))
        .routes(routes!(server::update_config))
        .routes(routes!(stats::get_stats))
        .split_for_parts();

    let api = api.layer(GovernorLayer::new(governor_config));

    Ok(Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
        .merge(api)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi))
        .fallback_service(ServeDir::new(&state.public_dir)))
}
