use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serenity::all::{ChannelId, Guild, GuildId, RoleId};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        dashboard::{ConfigUpdateDto, GuildConfigDto, ServerDetailDto, ServerSummaryDto},
    },
    server::{
        data::lockdown::LockdownRepository,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::guild_config::ConfigUpdate,
        state::AppState,
        util::parse::parse_u64_from_string,
    },
};

pub static SERVER_TAG: &str = "server";

pub fn summary_of(guild: &Guild) -> ServerSummaryDto {
    ServerSummaryDto {
        id: guild.id.to_string(),
        name: guild.name.clone(),
        icon: guild.icon_url(),
        member_count: guild.member_count,
        owner_id: guild.owner_id.to_string(),
        has_bot: true,
    }
}

/// Channel and role ids in `update` must belong to `guild`.
pub fn validate_targets(guild: &Guild, update: &ConfigUpdate) -> Result<(), AppError> {
    match update {
        ConfigUpdate::ModLogChannel(Some(channel_id))
            if !guild.channels.contains_key(&ChannelId::new(*channel_id)) =>
        {
            Err(AppError::BadRequest(format!(
                "Channel {} is not in this server",
                channel_id
            )))
        }
        ConfigUpdate::Role(_, Some(role_id))
            if !guild.roles.contains_key(&RoleId::new(*role_id)) =>
        {
            Err(AppError::BadRequest(format!(
                "Role {} is not in this server",
                role_id
            )))
        }
        _ => Ok(()),
    }
}

#[utoipa::path(
    get,
    path = "/api/servers",
    tag = SERVER_TAG,
    responses(
        (status = 200, description = "Manageable servers the bot is in", body = Vec<ServerSummaryDto>),
        (status = 401, description = "User not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_servers(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&session).require(&[]).await?;

    let mut servers = Vec::new();
    for id in &user.manageable_guilds {
        let guild_id = GuildId::new(parse_u64_from_string(id)?);
        if let Some(summary) = state.discord.cache.guild(guild_id).map(|g| summary_of(&g)) {
            servers.push(summary);
        }
    }

    Ok((StatusCode::OK, Json(servers)))
}

#[utoipa::path(
    get,
    path = "/api/server/{guild_id}",
    tag = SERVER_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Server details and configuration", body = ServerDetailDto),
        (status = 401, description = "User not logged in", body = ErrorDto),
        (status = 403, description = "User may not manage this server", body = ErrorDto),
        (status = 404, description = "Bot is not in this server", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_server(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let Some(summary) = state
        .discord
        .cache
        .guild(GuildId::new(guild_id))
        .map(|g| summary_of(&g))
    else {
        return Err(AppError::NotFound(format!(
            "Bot is not in server {}",
            guild_id
        )));
    };

    let config = state.configs.get(guild_id).await?;
    let locked_down = LockdownRepository::new(&state.db)
        .find_by_guild_id(guild_id)
        .await?
        .is_some();

    Ok((
        StatusCode::OK,
        Json(ServerDetailDto {
            id: summary.id,
            name: summary.name,
            icon: summary.icon,
            member_count: summary.member_count,
            owner_id: summary.owner_id,
            locked_down,
            config: config.into_dto(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/server/{guild_id}/config",
    tag = SERVER_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = ConfigUpdateDto,
    responses(
        (status = 200, description = "Updated configuration", body = GuildConfigDto),
        (status = 400, description = "Unknown setting or invalid value", body = ErrorDto),
        (status = 401, description = "User not logged in", body = ErrorDto),
        (status = 403, description = "User may not manage this server", body = ErrorDto),
        (status = 404, description = "Bot is not in this server", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<ConfigUpdateDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let update =
        ConfigUpdate::parse(&payload.setting, &payload.value).map_err(AppError::BadRequest)?;

    {
        let guild = state
            .discord
            .cache
            .guild(GuildId::new(guild_id))
            .ok_or_else(|| AppError::NotFound(format!("Bot is not in server {}", guild_id)))?;
        validate_targets(&guild, &update)?;
    }

    let config = state.configs.update(guild_id, update).await?;

    tracing::info!(
        "{} ({}) set {} in guild {} from the dashboard",
        user.username,
        user.id,
        payload.setting,
        guild_id
    );

    Ok((StatusCode::OK, Json(config.into_dto())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::guild_config::ConfigRole;
    use test_utils::serenity::{create_test_guild_with, role_json};

    #[test]
    fn summarizes_cached_guild() {
        let guild = create_test_guild_with(42, "Guild", Vec::new(), &[]);

        let summary = summary_of(&guild);

        assert_eq!(summary.id, "42");
        assert_eq!(summary.name, "Guild");
        assert!(summary.has_bot);
    }

    /// Tests that config updates may only point at the guild's own channels and roles.
    ///
    /// Expected: ids from another guild rejected, own ids and clears accepted
    #[test]
    fn rejects_targets_outside_the_guild() {
        let guild = create_test_guild_with(
            42,
            "Guild",
            vec![role_json(500, "Verified", 0, 1, 0)],
            &[(600, "mod-log", 0, None)],
        );

        assert!(validate_targets(&guild, &ConfigUpdate::ModLogChannel(Some(600))).is_ok());
        assert!(validate_targets(&guild, &ConfigUpdate::ModLogChannel(None)).is_ok());
        assert!(matches!(
            validate_targets(&guild, &ConfigUpdate::ModLogChannel(Some(601))),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_targets(&guild, &ConfigUpdate::Role(ConfigRole::Verified, Some(500))).is_ok());
        assert!(matches!(
            validate_targets(&guild, &ConfigUpdate::Role(ConfigRole::Gaming, Some(501))),
            Err(AppError::BadRequest(_))
        ));
    }
}
