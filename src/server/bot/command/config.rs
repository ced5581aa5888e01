//! `/config view|modlog|feature|roles`.

use serenity::all::{
    ChannelType, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, CreateEmbed, Permissions, Timestamp,
};

use super::{guild_of, options, reply_embed, reply_text};
use crate::server::{
    error::AppError,
    model::guild_config::{ConfigRole, ConfigUpdate, Feature, GuildConfig},
    state::BotState,
};

pub const NAME: &str = "config";

const COLOR_CONFIG: u32 = 0x5865f2;

pub fn register() -> CreateCommand {
    let mut feature = CreateCommandOption::new(
        CommandOptionType::String,
        "feature",
        "Feature to toggle",
    )
    .required(true);
    for f in Feature::ALL {
        feature = feature.add_string_choice(f.label(), f.setting());
    }

    CreateCommand::new(NAME)
        .description("Configure Nexus for this server")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "view",
            "Show the current configuration",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "modlog",
                "Set the mod log channel (omit to disable)",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel for mod log embeds",
                )
                .channel_types(vec![ChannelType::Text]),
            ),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "feature", "Turn a feature on or off")
                .add_sub_option(feature)
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::Boolean, "enabled", "On or off")
                        .required(true),
                ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "roles",
                "Set a role the bot hands out (omit the role to clear)",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "kind", "Which role")
                    .required(true)
                    .add_string_choice("Gaming", ConfigRole::Gaming.setting())
                    .add_string_choice("Streaming", ConfigRole::Streaming.setting())
                    .add_string_choice("Verified", ConfigRole::Verified.setting()),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Role,
                "role",
                "Role to use",
            )),
        )
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?.get();
    let resolved = command.data.options();

    let (update, message) = match options::subcommand(&resolved) {
        Some(("view", _)) => {
            let config = state.configs.get(guild_id).await?;
            return reply_embed(ctx, command, config_embed(&config), true).await;
        }
        Some(("modlog", args)) => {
            let channel = options::channel_id(args, "channel");
            let message = match channel {
                Some(id) => format!("✅ Mod log will be posted to <#{}>.", id),
                None => "✅ Mod log disabled.".to_string(),
            };
            (ConfigUpdate::ModLogChannel(channel), message)
        }
        Some(("feature", args)) => {
            let feature = options::string(args, "feature")
                .and_then(Feature::from_setting)
                .ok_or_else(|| AppError::BadRequest("Unknown feature.".to_string()))?;
            let enabled = options::boolean(args, "enabled").unwrap_or(false);
            let message = format!(
                "✅ {} {}.",
                feature.label(),
                if enabled { "enabled" } else { "disabled" }
            );
            (ConfigUpdate::Feature(feature, enabled), message)
        }
        Some(("roles", args)) => {
            let kind = options::string(args, "kind")
                .and_then(ConfigRole::from_setting)
                .ok_or_else(|| AppError::BadRequest("Unknown role kind.".to_string()))?;
            let role = options::role(args, "role").map(|r| r.id.get());
            let message = match role {
                Some(id) => format!("✅ `{}` set to <@&{}>.", kind.setting(), id),
                None => format!("✅ `{}` cleared.", kind.setting()),
            };
            (ConfigUpdate::Role(kind, role), message)
        }
        _ => return Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    };

    state.configs.update(guild_id, update).await?;
    tracing::info!(
        "Guild {} config changed by {}: {}",
        guild_id,
        command.user.id,
        message
    );

    reply_text(ctx, command, message, true).await
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "✅ On"
    } else {
        "❌ Off"
    }
}

fn mention_role(role: Option<u64>) -> String {
    role.map(|id| format!("<@&{}>", id))
        .unwrap_or_else(|| "Not set".to_string())
}

pub fn config_embed(config: &GuildConfig) -> CreateEmbed {
    let features = Feature::ALL
        .iter()
        .map(|f| format!("**{}:** {}", f.label(), on_off(config.feature_enabled(*f))))
        .collect::<Vec<_>>()
        .join("\n");

    let roles = format!(
        "**Gaming:** {}\n**Streaming:** {}\n**Verified:** {}",
        mention_role(config.role(ConfigRole::Gaming)),
        mention_role(config.role(ConfigRole::Streaming)),
        mention_role(config.role(ConfigRole::Verified)),
    );

    CreateEmbed::new()
        .title("⚙️ Server Configuration")
        .color(COLOR_CONFIG)
        .field(
            "Mod Log",
            config
                .mod_log_channel_id
                .map(|id| format!("<#{}>", id))
                .unwrap_or_else(|| "Not set".to_string()),
            true,
        )
        .field("Punishment", config.punishment.as_str(), true)
        .field(
            "Lockdown Duration",
            format!("{} min", config.lockdown_minutes),
            true,
        )
        .field("Features", features, false)
        .field("Roles", roles, false)
        .timestamp(Timestamp::now())
}
