//! `/threatdashboard live|history|stats` and its refresh button.

use chrono::Utc;
use serenity::all::{
    CommandInteraction, CommandOptionType, ComponentInteraction, Context, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
    GuildId, Permissions,
};

use super::{guild_name, guild_of, options, reply_embed};
use crate::server::{
    error::AppError,
    service::threat_dashboard::{
        history_embed, live_embed, refresh_button, stats_embed, ThreatDashboardService,
        DEFAULT_HISTORY_HOURS, MAX_HISTORY_HOURS,
    },
    state::BotState,
};

pub const NAME: &str = "threatdashboard";

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("View real-time threat monitoring dashboard")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "live",
            "View live threat monitoring",
        ))
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "history", "View threat history")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "hours",
                        "Hours of history to view (default: 24)",
                    )
                    .min_int_value(1)
                    .max_int_value(MAX_HISTORY_HOURS as u64),
                ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "stats",
            "View threat statistics",
        ))
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?;
    let resolved = command.data.options();

    match options::subcommand(&resolved) {
        Some(("live", _)) => {
            let embed = live_view(ctx, state, guild_id).await?;
            command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .embed(embed)
                            .components(vec![refresh_button()]),
                    ),
                )
                .await?;
            Ok(())
        }
        Some(("history", args)) => {
            let hours = options::integer(args, "hours")
                .unwrap_or(DEFAULT_HISTORY_HOURS)
                .clamp(1, MAX_HISTORY_HOURS);
            let (threats, cases) = ThreatDashboardService::new(&state.db)
                .history(guild_id.get(), hours, Utc::now())
                .await?;

            let embed = history_embed(&guild_name(ctx, guild_id), hours, &threats, &cases);
            reply_embed(ctx, command, embed, false).await
        }
        Some(("stats", _)) => {
            let (threats, case_count) = ThreatDashboardService::new(&state.db)
                .all_time(guild_id.get())
                .await?;
            let member_count = ctx
                .cache
                .guild(guild_id)
                .map(|guild| guild.member_count)
                .unwrap_or_default();

            let embed = stats_embed(
                &guild_name(ctx, guild_id),
                member_count,
                &threats,
                case_count,
                Utc::now(),
            );
            reply_embed(ctx, command, embed, false).await
        }
        _ => Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    }
}

/// Re-renders the live view in place.
pub async fn refresh(
    ctx: &Context,
    state: &BotState,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };

    let embed = live_view(ctx, state, guild_id).await?;
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![refresh_button()]),
            ),
        )
        .await?;

    Ok(())
}

async fn live_view(
    ctx: &Context,
    state: &BotState,
    guild_id: GuildId,
) -> Result<CreateEmbed, AppError> {
    let config = state.configs.get(guild_id.get()).await?;
    let status = ThreatDashboardService::new(&state.db)
        .live_status(
            guild_id.get(),
            config.anti_nuke_enabled,
            &state.tracker,
            &state.performance,
            Utc::now(),
        )
        .await?;

    Ok(live_embed(&guild_name(ctx, guild_id), &status))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the history subcommand's hour bounds.
    ///
    /// Expected: hours limited to 1..=168
    #[test]
    fn history_hours_are_bounded() {
        let definition = serde_json::to_value(register()).unwrap();
        let history = &definition["options"][1];
        let hours = &history["options"][0];

        assert_eq!(history["name"], "history");
        assert_eq!(hours["min_value"], 1);
        assert_eq!(hours["max_value"], 168);
        assert_eq!(definition["default_member_permissions"], "32");
    }
}
