use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// CSRF state in the OAuth callback does not match the one stored in the session.
    #[error("Failed to login user due to CSRF state mismatch")]
    CsrfValidationFailed,

    /// No CSRF state was stored in the session before the callback.
    #[error("Failed to login user due to missing CSRF state in session")]
    CsrfMissingValue,

    /// Exchanging the OAuth code for a token failed.
    #[error("Failed to exchange OAuth code: {0}")]
    TokenExchange(String),

    /// No dashboard user in the session.
    #[error("User is not logged in")]
    NotLoggedIn,

    /// The user may not manage the requested guild.
    #[error("User {user_id} may not manage guild {guild_id}")]
    GuildAccessDenied { user_id: String, guild_id: u64 },

    /// The user is not the configured bot owner.
    #[error("User {0} is not the bot owner")]
    NotOwner(u64),
}

/// Converts authentication errors into HTTP responses.
///
/// - `CsrfValidationFailed` / `CsrfMissingValue` → 400 with a retry message
/// - `NotLoggedIn` → 401 Unauthorized
/// - `GuildAccessDenied` / `NotOwner` → 403 Forbidden
/// - `TokenExchange` → 500 with a generic message
///
/// Details are logged at debug level; client messages stay generic.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("{}", self);

        let (status, message) = match self {
            Self::CsrfValidationFailed | Self::CsrfMissingValue => (
                StatusCode::BAD_REQUEST,
                "There was an issue logging you in, please try again.",
            ),
            Self::NotLoggedIn => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::GuildAccessDenied { .. } | Self::NotOwner(_) => {
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            Self::TokenExchange(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (
            status,
            Json(ErrorDto {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
