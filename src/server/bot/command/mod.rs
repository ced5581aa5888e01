//! Slash commands.
//!
//! Commands are registered per guild when the guild becomes available (see
//! [`register_guild_commands`]) and routed through [`dispatch`], which times every run,
//! records a `command_usage` row and reports failures back to the invoking user.

pub mod antinuke;
pub mod backup;
pub mod bulk;
pub mod config;
pub mod options;
pub mod performance;
pub mod threat_dashboard;
pub mod verify;

use std::time::Instant;

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
    GuildId,
};
use serenity::http::Http;

use crate::server::{
    data::command_usage::CommandUsageRepository,
    error::{log_bot_error, AppError},
    model::usage::CreateUsageParam,
    state::BotState,
};

/// Every command the bot offers.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        threat_dashboard::register(),
        bulk::register(),
        antinuke::register(),
        config::register(),
        verify::register(),
        backup::register(),
        performance::register(),
    ]
}

/// Replaces the guild's command set with [`definitions`].
pub async fn register_guild_commands(http: &Http, guild_id: GuildId) -> Result<usize, AppError> {
    let commands = guild_id.set_commands(http, definitions()).await?;

    Ok(commands.len())
}

/// Runs a command, then records its timing and usage.
pub async fn dispatch(ctx: &Context, state: &BotState, command: &CommandInteraction) {
    let name = command.data.name.as_str();
    let started = Instant::now();

    let result = match name {
        threat_dashboard::NAME => threat_dashboard::run(ctx, state, command).await,
        bulk::NAME => bulk::run(ctx, state, command).await,
        antinuke::NAME => antinuke::run(ctx, state, command).await,
        config::NAME => config::run(ctx, state, command).await,
        verify::NAME => verify::run(ctx, state, command).await,
        backup::NAME => backup::run(ctx, state, command).await,
        performance::NAME => performance::run(ctx, state, command).await,
        other => {
            tracing::warn!("Received unknown command /{}", other);
            return;
        }
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    state.performance.record_command(name, duration_ms).await;

    if let Err(e) = &result {
        if !matches!(e, AppError::BadRequest(_)) {
            state
                .performance
                .record_command_error(name, &e.to_string())
                .await;
            log_bot_error(&format!("/{} failed", name), e);
        }
        reply_failure(ctx, command, e).await;
    }

    let usage = CreateUsageParam {
        command: name.to_string(),
        guild_id: command.guild_id.map(|id| id.get()),
        user_id: command.user.id.get(),
        duration_ms,
        success: result.is_ok(),
    };
    if let Err(e) = CommandUsageRepository::new(&state.db).create(usage).await {
        tracing::error!("Failed to record usage of /{}: {}", name, e);
    }
}

/// Message shown to the user when a command fails.
///
/// Only validation messages are echoed; internal errors stay in the logs.
pub fn failure_message(err: &AppError) -> String {
    match err {
        AppError::BadRequest(msg) | AppError::NotFound(msg) => format!("❌ {}", msg),
        err if err.is_missing_permissions() => {
            "❌ I'm missing the permissions needed for that.".to_string()
        }
        _ => "❌ Something went wrong while running this command.".to_string(),
    }
}

async fn reply_failure(ctx: &Context, command: &CommandInteraction, err: &AppError) {
    let content = failure_message(err);

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(&content)
            .ephemeral(true),
    );
    if command.create_response(&ctx.http, response).await.is_ok() {
        return;
    }

    // Already acknowledged (deferred or answered).
    let followup = CreateInteractionResponseFollowup::new()
        .content(content)
        .ephemeral(true);
    if let Err(e) = command.create_followup(&ctx.http, followup).await {
        tracing::debug!("Failed to report command failure: {}", e);
    }
}

/// Guild the command was used in.
pub fn guild_of(command: &CommandInteraction) -> Result<GuildId, AppError> {
    command
        .guild_id
        .ok_or_else(|| AppError::BadRequest("This command can only be used in a server.".to_string()))
}

/// Name of a cached guild, falling back to its id.
pub fn guild_name(ctx: &Context, guild_id: GuildId) -> String {
    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| guild_id.to_string())
}

pub async fn reply_embed(
    ctx: &Context,
    command: &CommandInteraction,
    embed: CreateEmbed,
    ephemeral: bool,
) -> Result<(), AppError> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(ephemeral),
            ),
        )
        .await?;

    Ok(())
}

pub async fn reply_text(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
    ephemeral: bool,
) -> Result<(), AppError> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(ephemeral),
            ),
        )
        .await?;

    Ok(())
}

/// Acknowledges a command that needs more than three seconds.
pub async fn defer_ephemeral(ctx: &Context, command: &CommandInteraction) -> Result<(), AppError> {
    command.defer_ephemeral(&ctx.http).await?;

    Ok(())
}

/// Replaces the deferred response.
pub async fn edit_reply(
    ctx: &Context,
    command: &CommandInteraction,
    reply: EditInteractionResponse,
) -> Result<(), AppError> {
    command.edit_response(&ctx.http, reply).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    /// Tests that every command is defined once with a description.
    ///
    /// Expected: seven uniquely named commands
    #[test]
    fn defines_each_command_once() {
        let definitions: Vec<Value> = definitions()
            .into_iter()
            .map(|c| serde_json::to_value(c).unwrap())
            .collect();

        let mut names: Vec<&str> = definitions
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        names.sort();
        names.dedup();

        assert_eq!(names.len(), 7);
        assert!(definitions
            .iter()
            .all(|d| !d["description"].as_str().unwrap().is_empty()));
    }

    /// Tests which failures are echoed to the user.
    ///
    /// Expected: validation messages shown, internal details hidden
    #[test]
    fn hides_internal_failure_details() {
        assert_eq!(
            failure_message(&AppError::BadRequest("No valid user IDs".to_string())),
            "❌ No valid user IDs"
        );
        assert_eq!(
            failure_message(&AppError::InternalError("db path /var/x".to_string())),
            "❌ Something went wrong while running this command."
        );
    }
}
