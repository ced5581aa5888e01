//! HTML pages of the dashboard. Scripts and styles are served from the same directory by
//! the router's static file service.

use std::path::Path;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::server::{
    error::AppError, middleware::session::DashboardSession, state::AppState,
};

const INDEX_PAGE: &str = "index.html";
const DASHBOARD_PAGE: &str = "dashboard.html";

/// GET / - Landing page, or the dashboard when already logged in
pub async fn index(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    if DashboardSession::new(&session).is_authenticated().await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    Ok(page(&state.public_dir, INDEX_PAGE).await?.into_response())
}

/// GET /dashboard - Dashboard page, requires login
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if !DashboardSession::new(&session).is_authenticated().await? {
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(page(&state.public_dir, DASHBOARD_PAGE).await?.into_response())
}

async fn page(public_dir: &Path, name: &str) -> Result<Html<String>, AppError> {
    let html = tokio::fs::read_to_string(public_dir.join(name))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read page {}: {}", name, e)))?;

    Ok(Html(html))
}
