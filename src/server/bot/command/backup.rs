//! `/backup create|list`.

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, Guild, Permissions, Timestamp,
};

use super::{guild_of, options, reply_embed};
use crate::server::{
    error::AppError, model::snapshot::GuildSnapshot, service::backup::BackupService,
    state::BotState,
};

pub const NAME: &str = "backup";

const COLOR_BACKUP: u32 = 0x48bb78;
const LIST_LIMIT: u64 = 10;

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Snapshot the server's roles and channels")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "create", "Create a backup now")
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::String,
                    "reason",
                    "Why the backup is taken",
                )),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "list",
            "Show the most recent backups",
        ))
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?;
    let backups = BackupService::new(&state.db, &state.configs);
    let resolved = command.data.options();

    match options::subcommand(&resolved) {
        Some(("create", args)) => {
            let reason = options::string(args, "reason")
                .map(|r| format!("{} (by {})", r, command.user.tag()))
                .unwrap_or_else(|| format!("Manual backup by {}", command.user.tag()));
            let guild = ctx
                .cache
                .guild(guild_id)
                .map(|guild| Guild::clone(&guild))
                .ok_or_else(|| AppError::NotFound("Server is not cached yet, try again shortly.".to_string()))?;

            let snapshot = backups.create(&guild, &reason).await?;

            let embed = CreateEmbed::new()
                .title("💾 Backup Created")
                .color(COLOR_BACKUP)
                .field("Backup", format!("#{}", snapshot.id), true)
                .field("Roles", snapshot.data.roles.len().to_string(), true)
                .field("Channels", snapshot.data.channels.len().to_string(), true)
                .field("Reason", snapshot.reason, false)
                .timestamp(Timestamp::now());
            reply_embed(ctx, command, embed, true).await
        }
        Some(("list", _)) => {
            let snapshots = backups.list(guild_id.get(), LIST_LIMIT).await?;
            reply_embed(ctx, command, list_embed(&snapshots), true).await
        }
        _ => Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    }
}

/// `snapshots` are newest first.
pub fn list_embed(snapshots: &[GuildSnapshot]) -> CreateEmbed {
    let description = if snapshots.is_empty() {
        "No backups yet.".to_string()
    } else {
        snapshots
            .iter()
            .map(|s| {
                format!(
                    "**#{}** <t:{}:R> {} roles, {} channels\n└ {}",
                    s.id,
                    s.created_at.timestamp(),
                    s.data.roles.len(),
                    s.data.channels.len(),
                    s.reason
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateEmbed::new()
        .title("💾 Recent Backups")
        .description(description)
        .color(COLOR_BACKUP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::{
        guild_config::GuildConfigService, performance::PerformanceMonitor,
    };
    use serde_json::Value;
    use test_utils::{builder::TestBuilder, serenity::create_test_guild_with};

    /// Tests listing a manual backup.
    ///
    /// Expected: the snapshot id and reason appear in the list
    #[tokio::test]
    async fn lists_created_backup() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let configs = GuildConfigService::new(db.clone(), PerformanceMonitor::new());
        let service = BackupService::new(db, &configs);

        let guild = create_test_guild_with(42, "Guild", Vec::new(), &[]);
        let created = service.create(&guild, "Manual backup by mod").await?;

        let snapshots = service.list(42, LIST_LIMIT).await?;
        let embed: Value = serde_json::to_value(list_embed(&snapshots)).unwrap();
        let description = embed["description"].as_str().unwrap();

        assert!(description.contains(&format!("**#{}**", created.id)));
        assert!(description.contains("Manual backup by mod"));

        Ok(())
    }

    #[test]
    fn empty_list_says_so() {
        let embed: Value = serde_json::to_value(list_embed(&[])).unwrap();
        assert_eq!(embed["description"], "No backups yet.");
    }
}
