//! Error types and HTTP response handling.
//!
//! `AppError` is the top-level error for the dashboard, the bot services and the scheduler.
//! It wraps the domain-specific errors and implements `IntoResponse` so dashboard
//! handlers can return it directly. Bot event handlers log it instead.

pub mod auth;
pub mod config;
pub mod internal;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    model::api::ErrorDto,
    server::error::{auth::AuthError, config::ConfigError, internal::InternalError},
};

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup. Always 500.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Authentication or authorization error.
    ///
    /// Delegates to `AuthError::into_response()` for the status code.
    #[error(transparent)]
    AuthErr(#[from] AuthError),

    /// Unexpected internal state, such as an unparsable stored id.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// SQLx driver error, raised by the session store.
    #[error(transparent)]
    SqlxErr(#[from] sea_orm::SqlxError),

    /// Session store operation error.
    #[error(transparent)]
    SessionErr(#[from] tower_sessions::session::Error),

    /// HTTP client error from reqwest (OAuth, webhooks, bot lists).
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to its size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// JSON (de)serialization error for stored snapshots and threat details.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// I/O error, e.g. binding the dashboard listener.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Resource not found. 404 with the message.
    #[error("{0}")]
    NotFound(String),

    /// Invalid request. 400 with the message.
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with a custom message.
    ///
    /// The message is logged, the client gets a generic 500.
    #[error("{0}")]
    InternalError(String),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Whether this is a Discord permission failure (Missing Access, Missing Permissions,
    /// Invalid OAuth2 token).
    ///
    /// Guild admins routinely leave the bot without access to the configured channels, so
    /// these are logged at debug level instead of error.
    pub fn is_missing_permissions(&self) -> bool {
        const PERMISSION_CODES: [isize; 3] = [50001, 50013, 50025];

        self.discord_error_code()
            .is_some_and(|code| PERMISSION_CODES.contains(&code))
    }

    /// Whether Discord reported the guild, channel, role, member or message as unknown.
    pub fn is_unknown_resource(&self) -> bool {
        const UNKNOWN_CODES: [isize; 5] = [10003, 10004, 10007, 10008, 10011];

        self.discord_error_code()
            .is_some_and(|code| UNKNOWN_CODES.contains(&code))
    }

    fn discord_error_code(&self) -> Option<isize> {
        use serenity::http::HttpError;

        match self {
            AppError::DiscordErr(err) => match err.as_ref() {
                serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
                    Some(response.error.code)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Logs an error raised while handling a Discord event or command.
///
/// Permission failures are logged at debug level, everything else at error level.
pub fn log_bot_error(context: &str, err: &AppError) {
    if err.is_missing_permissions() {
        tracing::debug!("{}: missing permissions: {}", context, err);
    } else {
        tracing::error!("{}: {}", context, err);
    }
}

/// Converts application errors into HTTP responses.
///
/// # Returns
/// - 400 Bad Request - For `BadRequest`
/// - 404 Not Found - For `NotFound`
/// - Variable - For `AuthErr`, delegated to `AuthError::into_response()`
/// - 500 Internal Server Error - For everything else
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::AuthErr(err) => err.into_response(),
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorDto { error: msg })).into_response()
            }
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorDto { error: msg })).into_response()
            }
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper converting any displayable error into a 500 with a generic body.
///
/// The full error is logged server-side only.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_bad_request_to_400() {
        let response = AppError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn maps_not_found_to_404() {
        let response = AppError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn hides_internal_errors_behind_500() {
        let response = AppError::InternalError("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_discord_errors_are_not_permission_failures() {
        assert!(!AppError::BadRequest("x".to_string()).is_missing_permissions());
    }
}
