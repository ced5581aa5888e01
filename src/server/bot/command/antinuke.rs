//! `/antinuke status|unlock|whitelist|threshold|punishment`.

use std::collections::HashMap;

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, Permissions, Timestamp,
};

use super::{guild_of, options, reply_embed, reply_text};
use crate::server::{
    data::{
        lockdown::LockdownRepository, threshold::ThresholdRepository,
        whitelist::WhitelistRepository,
    },
    error::AppError,
    model::{
        antinuke::{ActionKind, LockdownState, Threshold, MAX_WINDOW_SECONDS},
        guild_config::{ConfigUpdate, GuildConfig, Punishment},
    },
    service::antinuke::lockdown::LockdownService,
    state::BotState,
};

pub const NAME: &str = "antinuke";

const COLOR_STATUS: u32 = 0x5865f2;
const MAX_LIMIT: u64 = 50;
const PUNISHMENTS: [Punishment; 4] = [
    Punishment::None,
    Punishment::StripRoles,
    Punishment::Kick,
    Punishment::Ban,
];

fn user_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::User, "user", description).required(true)
}

pub fn register() -> CreateCommand {
    let mut action = CreateCommandOption::new(
        CommandOptionType::String,
        "action",
        "Monitored action",
    )
    .required(true);
    for kind in ActionKind::ALL {
        action = action.add_string_choice(kind.label(), kind.as_str());
    }

    let mut punishment = CreateCommandOption::new(
        CommandOptionType::String,
        "type",
        "What happens to the executor of a detected nuke",
    )
    .required(true);
    for p in PUNISHMENTS {
        punishment = punishment.add_string_choice(p.as_str(), p.as_str());
    }

    CreateCommand::new(NAME)
        .description("Anti-nuke protection settings")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "status",
            "Show anti-nuke status, lockdown and thresholds",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "unlock",
            "Lift an active lockdown",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommandGroup,
                "whitelist",
                "Users exempt from anti-nuke",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Whitelist a user")
                    .add_sub_option(user_option("User to whitelist")),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "remove",
                    "Remove a user from the whitelist",
                )
                .add_sub_option(user_option("User to remove")),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "list",
                "List whitelisted users",
            )),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "threshold",
                "Set how many actions within a window trigger a response",
            )
            .add_sub_option(action)
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Integer, "limit", "Actions allowed")
                    .required(true)
                    .min_int_value(1)
                    .max_int_value(MAX_LIMIT),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "window_seconds",
                    "Window length in seconds",
                )
                .required(true)
                .min_int_value(1)
                .max_int_value(MAX_WINDOW_SECONDS as u64),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "punishment",
                "Set the punishment for detected nukes",
            )
            .add_sub_option(punishment),
        )
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?.get();
    let resolved = command.data.options();

    match options::subcommand(&resolved) {
        Some(("status", _)) => {
            let config = state.configs.get(guild_id).await?;
            let lockdown = LockdownRepository::new(&state.db)
                .find_by_guild_id(guild_id)
                .await?;
            let whitelisted = WhitelistRepository::new(&state.db)
                .get_by_guild(guild_id)
                .await?
                .len();
            let overrides = ThresholdRepository::new(&state.db)
                .get_by_guild(guild_id)
                .await?;

            let embed = status_embed(&config, lockdown.as_ref(), whitelisted, &overrides);
            reply_embed(ctx, command, embed, true).await
        }
        Some(("unlock", _)) => {
            let unlocked = LockdownService::new(&state.db, &ctx.http)
                .unlock(guild_id)
                .await?;
            let message = if unlocked {
                "🔓 Lockdown lifted. `@everyone` permissions have been restored."
            } else {
                "ℹ️ This server is not locked down."
            };
            reply_text(ctx, command, message, false).await
        }
        Some(("whitelist", group)) => whitelist(ctx, state, command, guild_id, group).await,
        Some(("threshold", args)) => {
            let kind: ActionKind = options::string(args, "action")
                .unwrap_or_default()
                .parse()
                .map_err(AppError::BadRequest)?;
            let limit = options::integer(args, "limit").unwrap_or(1).clamp(1, MAX_LIMIT as i64);
            let window = options::integer(args, "window_seconds").unwrap_or(1);

            let threshold = ThresholdRepository::new(&state.db)
                .set(guild_id, kind, Threshold::new(limit as u32, window))
                .await?;

            reply_text(
                ctx,
                command,
                format!(
                    "✅ **{}** now trigger after {} within {}s.",
                    kind.label(),
                    threshold.limit,
                    threshold.window_seconds()
                ),
                true,
            )
            .await
        }
        Some(("punishment", args)) => {
            let punishment: Punishment = options::string(args, "type")
                .unwrap_or_default()
                .parse()
                .map_err(AppError::BadRequest)?;
            state
                .configs
                .update(guild_id, ConfigUpdate::Punishment(punishment))
                .await?;

            reply_text(
                ctx,
                command,
                format!("✅ Nuke punishment set to `{}`.", punishment),
                true,
            )
            .await
        }
        _ => Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    }
}

async fn whitelist(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
    guild_id: u64,
    group: &[serenity::all::ResolvedOption<'_>],
) -> Result<(), AppError> {
    let repo = WhitelistRepository::new(&state.db);

    match options::subcommand(group) {
        Some(("add", args)) => {
            let user = options::user(args, "user")
                .ok_or_else(|| AppError::BadRequest("A user is required.".to_string()))?;
            let message = match repo
                .add(guild_id, user.id.get(), command.user.id.get())
                .await?
            {
                Some(_) => format!("✅ <@{}> is now exempt from anti-nuke.", user.id),
                None => format!("ℹ️ <@{}> is already whitelisted.", user.id),
            };
            reply_text(ctx, command, message, true).await
        }
        Some(("remove", args)) => {
            let user = options::user(args, "user")
                .ok_or_else(|| AppError::BadRequest("A user is required.".to_string()))?;
            let message = if repo.remove(guild_id, user.id.get()).await? {
                format!("✅ <@{}> removed from the whitelist.", user.id)
            } else {
                format!("ℹ️ <@{}> was not whitelisted.", user.id)
            };
            reply_text(ctx, command, message, true).await
        }
        Some(("list", _)) => {
            let entries = repo.get_by_guild(guild_id).await?;
            let description = if entries.is_empty() {
                "No users are whitelisted.".to_string()
            } else {
                entries
                    .iter()
                    .map(|e| format!("• <@{}> (added by <@{}>)", e.user_id, e.added_by))
                    .collect::<Vec<_>>()
                    .join("\n")
            };

            let embed = CreateEmbed::new()
                .title("📋 Anti-Nuke Whitelist")
                .description(description)
                .color(COLOR_STATUS);
            reply_embed(ctx, command, embed, true).await
        }
        _ => Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    }
}

/// Effective thresholds for every kind, overrides first.
pub fn threshold_lines(overrides: &HashMap<ActionKind, Threshold>) -> String {
    ActionKind::ALL
        .iter()
        .map(|kind| {
            let (threshold, marker) = match overrides.get(kind) {
                Some(threshold) => (*threshold, " (custom)"),
                None => (kind.default_threshold(), ""),
            };
            format!(
                "**{}:** {} / {}s{}",
                kind.label(),
                threshold.limit,
                threshold.window_seconds(),
                marker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_embed(
    config: &GuildConfig,
    lockdown: Option<&LockdownState>,
    whitelisted: usize,
    overrides: &HashMap<ActionKind, Threshold>,
) -> CreateEmbed {
    let protection = if config.anti_nuke_enabled {
        "🟢 Enabled"
    } else {
        "⚪ Disabled"
    };
    let lockdown_line = match lockdown {
        Some(state) => format!(
            "🔴 Active until <t:{}:R>\n{}",
            state.expires_at.timestamp(),
            state.reason
        ),
        None => "🟢 Not locked down".to_string(),
    };

    CreateEmbed::new()
        .title("🛡️ Anti-Nuke Status")
        .color(COLOR_STATUS)
        .field("Protection", protection, true)
        .field("Punishment", config.punishment.as_str(), true)
        .field("Whitelisted Users", whitelisted.to_string(), true)
        .field(
            "Lockdown",
            format!("{}\nDuration: {} min", lockdown_line, config.lockdown_minutes),
            false,
        )
        .field("Thresholds", threshold_lines(overrides), false)
        .timestamp(Timestamp::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    /// Tests that overrides are marked and defaults fill the rest.
    ///
    /// Expected: one line per kind, custom marker on the override
    #[test]
    fn lists_effective_thresholds() {
        let mut overrides = HashMap::new();
        overrides.insert(ActionKind::MemberBan, Threshold::new(2, 30));

        let lines = threshold_lines(&overrides);

        assert_eq!(lines.lines().count(), ActionKind::ALL.len());
        assert!(lines.contains("**Bans:** 2 / 30s (custom)"));
        assert!(lines.contains("**Channel deletions:** 3 / 10s"));
    }

    /// Tests the status embed of a locked down guild.
    ///
    /// Expected: lockdown field shows the expiry and reason
    #[test]
    fn status_shows_active_lockdown() {
        let config = GuildConfig::default_for(1);
        let lockdown = LockdownState {
            guild_id: 1,
            reason: "Anti-nuke: 3 bans within 10s".to_string(),
            previous_permissions: 0,
            locked_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            expires_at: Utc.timestamp_opt(1_700_001_800, 0).unwrap(),
        };

        let embed: Value =
            serde_json::to_value(status_embed(&config, Some(&lockdown), 2, &HashMap::new()))
                .unwrap();
        let lockdown_field = embed["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "Lockdown")
            .unwrap();

        assert!(lockdown_field["value"]
            .as_str()
            .unwrap()
            .contains("<t:1700001800:R>"));
        assert_eq!(embed["fields"][2]["value"], "2");
    }

    /// Tests the threshold action choices.
    ///
    /// Expected: one choice per monitored action
    #[test]
    fn threshold_offers_every_action() {
        let definition = serde_json::to_value(register()).unwrap();
        let threshold = definition["options"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| o["name"] == "threshold")
            .unwrap();

        assert_eq!(
            threshold["options"][0]["choices"].as_array().unwrap().len(),
            ActionKind::ALL.len()
        );
    }
}
