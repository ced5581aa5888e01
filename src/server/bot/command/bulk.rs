//! `/bulk ban|kick|role|purge-bots|purge-new`.
//!
//! Every subcommand defers ephemerally, since acting on up to 50 members easily outlasts
//! the interaction deadline.

use chrono::{Duration, Utc};
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    EditInteractionResponse, Permissions, ResolvedOption,
};

use super::{defer_ephemeral, edit_reply, guild_of, options};
use crate::server::{
    error::AppError,
    service::moderation::{
        parse_user_ids, select_bots, select_joined_after, BulkAction, ModerationService,
    },
    state::BotState,
};

pub const NAME: &str = "bulk";

const MAX_DELETE_DAYS: u8 = 7;
const MAX_PURGE_HOURS: i64 = 72;
const CONFIRM_HINT: &str = "❌ You must confirm this action by setting confirm:True";

fn user_ids_option() -> CreateCommandOption {
    CreateCommandOption::new(
        CommandOptionType::String,
        "user-ids",
        "User IDs separated by commas or spaces",
    )
    .required(true)
}

fn confirm_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Boolean, "confirm", description).required(true)
}

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Perform bulk moderation operations")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "ban", "Ban multiple users at once")
                .add_sub_option(user_ids_option())
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::String,
                    "reason",
                    "Reason for bans",
                ))
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "delete-days",
                        "Days of messages to delete (0-7)",
                    )
                    .min_int_value(0)
                    .max_int_value(MAX_DELETE_DAYS as u64),
                ),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "kick", "Kick multiple users at once")
                .add_sub_option(user_ids_option())
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::String,
                    "reason",
                    "Reason for kicks",
                )),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "role",
                "Assign or remove a role from multiple users",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Role, "role", "Role to assign/remove")
                    .required(true),
            )
            .add_sub_option(user_ids_option())
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "action", "Add or remove role")
                    .required(true)
                    .add_string_choice("Add", "add")
                    .add_string_choice("Remove", "remove"),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "purge-bots",
                "Kick all bot accounts from the server",
            )
            .add_sub_option(confirm_option("Confirm you want to kick ALL bots")),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "purge-new",
                "Kick all members who joined in the last X hours",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "hours",
                    "Hours (kick members who joined in last X hours)",
                )
                .required(true)
                .min_int_value(1)
                .max_int_value(MAX_PURGE_HOURS as u64),
            )
            .add_sub_option(confirm_option("Confirm bulk kick")),
        )
}

/// Audit log reason naming the moderator.
pub fn audit_reason(reason: &str, verb: &str, moderator_tag: &str) -> String {
    format!("{} (Bulk {} by {})", reason, verb, moderator_tag)
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?.get();
    let resolved = command.data.options();
    let Some((sub, args)) = options::subcommand(&resolved) else {
        return Err(AppError::BadRequest("Unknown subcommand.".to_string()));
    };

    defer_ephemeral(ctx, command).await?;

    let moderation = ModerationService::new(&state.db, &ctx.http);
    let moderator_id = command.user.id.get();
    let moderator_tag = command.user.tag();

    let reply = match sub {
        "ban" | "kick" | "role" => {
            let raw = options::string(args, "user-ids").unwrap_or_default();
            let targets = match parse_user_ids(raw) {
                Ok(targets) => targets,
                Err(e) => {
                    return edit_reply(ctx, command, EditInteractionResponse::new().content(e.message()))
                        .await
                }
            };

            let (action, title, reason) = targeted_action(sub, args, &moderator_tag)?;
            let outcome = moderation
                .run(guild_id, moderator_id, &targets, action, &reason)
                .await;

            EditInteractionResponse::new().embed(outcome.to_embed(&title, "user"))
        }
        "purge-bots" => {
            if !options::boolean(args, "confirm").unwrap_or(false) {
                return edit_reply(ctx, command, EditInteractionResponse::new().content(CONFIRM_HINT))
                    .await;
            }

            let members = moderation.fetch_members(guild_id).await?;
            let bots = select_bots(&members, ctx.cache.current_user().id.get());
            if bots.is_empty() {
                EditInteractionResponse::new().content("✅ No bot accounts found (other than me!)")
            } else {
                let reason = audit_reason("Bot purge", "kick", &moderator_tag);
                let outcome = moderation
                    .kick_members(guild_id, moderator_id, &bots, &reason)
                    .await;

                EditInteractionResponse::new().embed(
                    outcome
                        .to_embed("🤖 Bot Purge Complete", "bot")
                        .description("Removed bot accounts from server"),
                )
            }
        }
        "purge-new" => {
            if !options::boolean(args, "confirm").unwrap_or(false) {
                return edit_reply(ctx, command, EditInteractionResponse::new().content(CONFIRM_HINT))
                    .await;
            }

            let hours = options::integer(args, "hours")
                .unwrap_or(1)
                .clamp(1, MAX_PURGE_HOURS);
            let cutoff = Utc::now() - Duration::hours(hours);

            let members = moderation.fetch_members(guild_id).await?;
            let recent = select_joined_after(&members, cutoff);
            if recent.is_empty() {
                EditInteractionResponse::new().content(format!(
                    "✅ No members joined in the last {} hour(s).",
                    hours
                ))
            } else {
                let reason = audit_reason(
                    &format!("Joined within the last {}h", hours),
                    "kick",
                    &moderator_tag,
                );
                let outcome = moderation
                    .kick_members(guild_id, moderator_id, &recent, &reason)
                    .await;

                EditInteractionResponse::new().embed(
                    outcome
                        .to_embed("🧹 New Member Purge Complete", "member")
                        .description(format!(
                            "Removed members who joined in the last {} hour(s)",
                            hours
                        )),
                )
            }
        }
        _ => return Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    };

    edit_reply(ctx, command, reply).await
}

/// Action, embed title and audit reason of the id-targeted subcommands.
fn targeted_action(
    sub: &str,
    args: &[ResolvedOption<'_>],
    moderator_tag: &str,
) -> Result<(BulkAction, String, String), AppError> {
    match sub {
        "ban" => {
            let delete_days = options::integer(args, "delete-days")
                .unwrap_or(0)
                .clamp(0, MAX_DELETE_DAYS as i64) as u8;
            let reason = options::string(args, "reason").unwrap_or("Bulk ban");

            Ok((
                BulkAction::Ban { delete_days },
                "⚔️ Bulk Ban Complete".to_string(),
                audit_reason(reason, "ban", moderator_tag),
            ))
        }
        "kick" => {
            let reason = options::string(args, "reason").unwrap_or("Bulk kick");

            Ok((
                BulkAction::Kick,
                "👢 Bulk Kick Complete".to_string(),
                audit_reason(reason, "kick", moderator_tag),
            ))
        }
        "role" => {
            let role = options::role(args, "role")
                .ok_or_else(|| AppError::BadRequest("A role is required.".to_string()))?;
            let adding = options::string(args, "action") == Some("add");

            let (action, title, verb) = if adding {
                (BulkAction::AddRole(role.id.get()), "Assignment", "role add")
            } else {
                (BulkAction::RemoveRole(role.id.get()), "Removal", "role remove")
            };

            Ok((
                action,
                format!("🎭 Bulk Role {} Complete", title),
                audit_reason(&format!("@{}", role.name), verb, moderator_tag),
            ))
        }
        other => Err(AppError::BadRequest(format!("Unknown subcommand '{}'.", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the audit reason format.
    ///
    /// Expected: reason followed by the action and moderator
    #[test]
    fn audit_reason_names_moderator() {
        assert_eq!(
            audit_reason("Raid", "ban", "mod#0001"),
            "Raid (Bulk ban by mod#0001)"
        );
    }

    /// Tests the registered subcommands and their option names.
    ///
    /// Expected: five subcommands, administrator only
    #[test]
    fn registers_all_subcommands() {
        let definition = serde_json::to_value(register()).unwrap();
        let subcommands: Vec<&str> = definition["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["name"].as_str().unwrap())
            .collect();

        assert_eq!(
            subcommands,
            vec!["ban", "kick", "role", "purge-bots", "purge-new"]
        );
        assert_eq!(definition["options"][0]["options"][0]["name"], "user-ids");
        assert_eq!(definition["default_member_permissions"], "8");
    }

    /// Tests that ban and kick fall back to default reasons.
    ///
    /// Expected: default reason used and delete days default to 0
    #[test]
    fn ban_without_options_uses_defaults() {
        let (action, title, reason) = targeted_action("ban", &[], "mod").unwrap();

        assert_eq!(action, BulkAction::Ban { delete_days: 0 });
        assert_eq!(title, "⚔️ Bulk Ban Complete");
        assert_eq!(reason, "Bulk ban (Bulk ban by mod)");
    }

    /// Tests the role subcommand without a resolved role.
    ///
    /// Expected: BadRequest
    #[test]
    fn role_requires_role_option() {
        assert!(matches!(
            targeted_action("role", &[], "mod"),
            Err(AppError::BadRequest(_))
        ));
    }
}
