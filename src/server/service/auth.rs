use oauth2::{
    basic::BasicTokenType, AuthorizationCode, CsrfToken, EmptyExtraTokenFields, Scope,
    StandardTokenResponse, TokenResponse,
};
use serde::Deserialize;
use serenity::all::User as DiscordUser;
use url::Url;

use crate::{
    model::dashboard::DashboardUserDto,
    server::{
        error::{auth::AuthError, AppError},
        state::OAuth2Client,
    },
};

const DISCORD_API: &str = "https://discord.com/api/v10";

/// ADMINISTRATOR permission bit.
const ADMINISTRATOR: u64 = 0x8;

/// Guild entry from `/users/@me/guilds`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserGuild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: bool,
    /// Permission bitfield, serialized by Discord as a string.
    #[serde(default)]
    pub permissions: String,
}

impl UserGuild {
    /// Owners and administrators may manage a guild from the dashboard.
    pub fn is_manageable(&self) -> bool {
        if self.owner {
            return true;
        }

        self.permissions
            .parse::<u64>()
            .is_ok_and(|perms| perms & ADMINISTRATOR == ADMINISTRATOR)
    }
}

pub fn manageable_guild_ids(guilds: &[UserGuild]) -> Vec<String> {
    guilds
        .iter()
        .filter(|g| g.is_manageable())
        .map(|g| g.id.clone())
        .collect()
}

/// Discord OAuth2 login for the dashboard.
pub struct AuthService<'a> {
    pub http_client: &'a reqwest::Client,
    pub oauth_client: &'a OAuth2Client,
}

impl<'a> AuthService<'a> {
    pub fn new(http_client: &'a reqwest::Client, oauth_client: &'a OAuth2Client) -> Self {
        Self {
            http_client,
            oauth_client,
        }
    }

    /// Authorization URL requesting the `identify` and `guilds` scopes, with its CSRF state.
    pub fn login_url(&self) -> (Url, CsrfToken) {
        self.oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("identify".to_string()))
            .add_scope(Scope::new("guilds".to_string()))
            .url()
    }

    /// Exchanges the code and builds the session user with the guilds they can manage.
    pub async fn callback(&self, authorization_code: String) -> Result<DashboardUserDto, AppError> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(authorization_code))
            .request_async(self.http_client)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let user = self.fetch_discord_user(&token).await?;
        let guilds = self.fetch_user_guilds(&token).await?;
        let manageable_guilds = manageable_guild_ids(&guilds);

        tracing::info!(
            "Dashboard login by {} ({}), {} manageable guilds",
            user.name,
            user.id,
            manageable_guilds.len()
        );

        Ok(DashboardUserDto {
            id: user.id.get().to_string(),
            username: user.name.clone(),
            avatar: user.avatar_url(),
            manageable_guilds,
        })
    }

    async fn fetch_discord_user(
        &self,
        token: &StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    ) -> Result<DiscordUser, AppError> {
        let user = self
            .http_client
            .get(format!("{}/users/@me", DISCORD_API))
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordUser>()
            .await?;

        Ok(user)
    }

    async fn fetch_user_guilds(
        &self,
        token: &StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    ) -> Result<Vec<UserGuild>, AppError> {
        let guilds = self
            .http_client
            .get(format!("{}/users/@me/guilds", DISCORD_API))
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UserGuild>>()
            .await?;

        Ok(guilds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild(id: &str, owner: bool, permissions: &str) -> UserGuild {
        UserGuild {
            id: id.to_string(),
            name: format!("Guild {}", id),
            owner,
            permissions: permissions.to_string(),
        }
    }

    #[test]
    fn owners_and_admins_can_manage() {
        let guilds = vec![
            guild("1", true, "0"),
            guild("2", false, "8"),
            guild("3", false, "2147483656"),
            guild("4", false, "32"),
            guild("5", false, "not a number"),
        ];

        assert_eq!(manageable_guild_ids(&guilds), vec!["1", "2", "3"]);
    }

    #[test]
    fn parses_discord_guild_payload() {
        let guilds: Vec<UserGuild> = serde_json::from_str(
            r#"[{"id":"123","name":"Test","icon":null,"owner":false,"permissions":"8","features":[]}]"#,
        )
        .unwrap();

        assert_eq!(guilds.len(), 1);
        assert!(guilds[0].is_manageable());
    }
}
