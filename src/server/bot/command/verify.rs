//! `/verify start|status`: presence verification.
//!
//! The member puts the issued code in their custom status; the presence handler completes
//! the verification and grants the configured verified role.

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed,
};

use super::{guild_of, options, reply_embed, reply_text};
use crate::server::{
    data::verification::VerificationRepository,
    error::AppError,
    model::verification::{PendingVerification, VerificationKind},
    service::presence::generate_code,
    state::BotState,
};

pub const NAME: &str = "verify";

const COLOR_PENDING: u32 = 0xfaa61a;

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Verify yourself through your Discord status")
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "start",
            "Get a verification code",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "status",
            "Check your pending verification",
        ))
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let guild_id = guild_of(command)?.get();
    let user_id = command.user.id.get();
    let config = state.configs.get(guild_id).await?;
    let repo = VerificationRepository::new(&state.db);
    let resolved = command.data.options();

    match options::subcommand(&resolved) {
        Some(("start", _)) => {
            if !config.presence_verification_enabled {
                return Err(AppError::BadRequest(
                    "Presence verification is not enabled on this server.".to_string(),
                ));
            }

            let pending = repo
                .upsert_pending(
                    guild_id,
                    user_id,
                    VerificationKind::Presence,
                    &generate_code(),
                    config.verified_role_id,
                )
                .await?;

            reply_embed(ctx, command, instructions_embed(&pending), true).await
        }
        Some(("status", _)) => match repo.find(guild_id, user_id).await? {
            Some(pending) => reply_embed(ctx, command, instructions_embed(&pending), true).await,
            None => {
                reply_text(
                    ctx,
                    command,
                    "✅ You have no pending verification.",
                    true,
                )
                .await
            }
        },
        _ => Err(AppError::BadRequest("Unknown subcommand.".to_string())),
    }
}

pub fn instructions_embed(pending: &PendingVerification) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔐 Presence Verification")
        .description(format!(
            "Set your **custom status** to include the code below. You will be verified \
             automatically as soon as Discord reports the new status.\n\n**Code:** `{}`",
            pending.code
        ))
        .color(COLOR_PENDING)
        .field(
            "Issued",
            format!("<t:{}:R>", pending.created_at.timestamp()),
            true,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::builder::TestBuilder;

    /// Tests that a reissued code replaces the pending one.
    ///
    /// Expected: one pending verification holding the newest code
    #[tokio::test]
    async fn reissue_replaces_code() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let repo = VerificationRepository::new(db);

        repo.upsert_pending(1, 2, VerificationKind::Presence, "NEXUS-AAAAAA", None)
            .await?;
        let second = repo
            .upsert_pending(1, 2, VerificationKind::Presence, &generate_code(), Some(9))
            .await?;

        let stored = repo.find(1, 2).await?.unwrap();
        assert_eq!(stored.code, second.code);
        assert_eq!(stored.verified_role_id, Some(9));

        let embed = serde_json::to_value(instructions_embed(&stored)).unwrap();
        assert!(embed["description"]
            .as_str()
            .unwrap()
            .contains(&stored.code));

        Ok(())
    }
}
