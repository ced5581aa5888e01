//! Type-safe session wrappers.
//!
//! Each struct wraps the same tower-sessions `Session` but exposes only the keys of its
//! concern:
//! - `DashboardSession` - the logged-in dashboard user
//! - `CsrfSession` - the OAuth state token between login and callback

use tower_sessions::Session;

use crate::{model::dashboard::DashboardUserDto, server::error::AppError};

const SESSION_DASHBOARD_USER: &str = "dashboard:user";
const SESSION_AUTH_CSRF_TOKEN: &str = "auth:csrf_token";

/// The logged-in dashboard user, stored whole at login.
///
/// The manageable guild list is taken from Discord once per login, so permission changes
/// take effect on the next login.
pub struct DashboardSession<'a> {
    session: &'a Session,
}

impl<'a> DashboardSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set_user(&self, user: &DashboardUserDto) -> Result<(), AppError> {
        self.session.insert(SESSION_DASHBOARD_USER, user).await?;
        Ok(())
    }

    /// `Ok(None)` when nobody is logged in.
    pub async fn get_user(&self) -> Result<Option<DashboardUserDto>, AppError> {
        Ok(self.session.get(SESSION_DASHBOARD_USER).await?)
    }

    pub async fn is_authenticated(&self) -> Result<bool, AppError> {
        Ok(self.get_user().await?.is_some())
    }

    /// Removes all session data, used on logout.
    pub async fn clear(&self) {
        self.session.clear().await;
    }
}

/// CSRF token storage for the OAuth flow.
pub struct CsrfSession<'a> {
    session: &'a Session,
}

impl<'a> CsrfSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set_token(&self, token: String) -> Result<(), AppError> {
        self.session.insert(SESSION_AUTH_CSRF_TOKEN, token).await?;
        Ok(())
    }

    /// Retrieves and removes the token, so each one is only accepted once.
    pub async fn take_token(&self) -> Result<Option<String>, AppError> {
        let token = self.session.remove(SESSION_AUTH_CSRF_TOKEN).await?;
        Ok(token)
    }
}
