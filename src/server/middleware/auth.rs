use tower_sessions::Session;

use crate::{
    model::dashboard::DashboardUserDto,
    server::{
        error::{auth::AuthError, AppError},
        middleware::session::DashboardSession,
    },
};

pub enum Permission {
    /// Owner of the guild or holder of ADMINISTRATOR in it.
    ManageGuild(u64),
}

pub struct AuthGuard<'a> {
    session: &'a Session,
}

impl<'a> AuthGuard<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Returns the logged-in user when they hold every permission.
    pub async fn require(&self, permissions: &[Permission]) -> Result<DashboardUserDto, AppError> {
        let Some(user) = DashboardSession::new(self.session).get_user().await? else {
            return Err(AuthError::NotLoggedIn.into());
        };

        for permission in permissions {
            match permission {
                Permission::ManageGuild(guild_id) => {
                    if !can_manage(&user, *guild_id) {
                        return Err(AuthError::GuildAccessDenied {
                            user_id: user.id.clone(),
                            guild_id: *guild_id,
                        }
                        .into());
                    }
                }
            }
        }

        Ok(user)
    }
}

pub fn can_manage(user: &DashboardUserDto, guild_id: u64) -> bool {
    let guild_id = guild_id.to_string();
    user.manageable_guilds.iter().any(|id| *id == guild_id)
}
