use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, dashboard::DashboardUserDto},
    server::{
        error::{auth::AuthError, AppError},
        middleware::{
            auth::AuthGuard,
            session::{CsrfSession, DashboardSession},
        },
        service::auth::AuthService,
        state::AppState,
    },
};

pub static AUTH_TAG: &str = "auth";

/// Query parameters Discord sends back to the OAuth callback.
///
/// `error` is set instead of `code` when the user cancels the authorization.
#[derive(Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /login - Redirects to Discord's authorization page
pub async fn login(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = AuthService::new(&state.http_client, &state.oauth_client);

    let (url, csrf_token) = auth_service.login_url();

    CsrfSession::new(&session)
        .set_token(csrf_token.secret().clone())
        .await?;

    Ok(Redirect::temporary(url.as_str()))
}

/// GET /callback - Completes the OAuth flow and stores the dashboard user
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = params.error {
        tracing::debug!("Dashboard login cancelled: {}", error);
        return Ok(Redirect::to("/"));
    }

    validate_csrf(&session, params.state.as_deref()).await?;

    let Some(code) = params.code else {
        return Err(AppError::BadRequest("Missing authorization code".to_string()));
    };

    let user = AuthService::new(&state.http_client, &state.oauth_client)
        .callback(code)
        .await?;

    session.cycle_id().await?;
    DashboardSession::new(&session).set_user(&user).await?;

    Ok(Redirect::to("/dashboard"))
}

/// GET /logout - Clears the session
pub async fn logout(session: Session) -> impl IntoResponse {
    DashboardSession::new(&session).clear().await;

    Redirect::to("/")
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "The logged-in dashboard user", body = DashboardUserDto),
        (status = 401, description = "User not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_user(session: Session) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&session).require(&[]).await?;

    Ok((StatusCode::OK, Json(user)))
}

async fn validate_csrf(session: &Session, csrf_state: Option<&str>) -> Result<(), AppError> {
    let Some(stored_state) = CsrfSession::new(session).take_token().await? else {
        return Err(AuthError::CsrfMissingValue.into());
    };

    if csrf_state == Some(stored_state.as_str()) {
        return Ok(());
    }

    Err(AuthError::CsrfValidationFailed.into())
}
