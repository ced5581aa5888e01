//! Bulk moderation: ban, kick, role changes and member purges.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serenity::{
    all::{CreateEmbed, GuildId, Member, RoleId, Timestamp, UserId},
    http::Http,
};

use crate::server::{
    data::moderation_case::ModerationCaseRepository,
    error::AppError,
    model::moderation::CreateCaseParam,
};

pub const MAX_BULK_TARGETS: usize = 50;

pub const COLOR_PARTIAL: u32 = 0xed8936;
pub const COLOR_SUCCESS: u32 = 0x48bb78;

const SHOWN_ERRORS: usize = 5;
const MEMBER_PAGE_SIZE: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    NoValidIds,
    TooMany(usize),
}

impl TargetError {
    pub fn message(&self) -> String {
        match self {
            Self::NoValidIds => {
                "❌ No valid user IDs found. Provide IDs separated by commas or spaces.".to_string()
            }
            Self::TooMany(count) => format!(
                "❌ Maximum {} users per bulk operation ({} given). Please split into multiple commands.",
                MAX_BULK_TARGETS, count
            ),
        }
    }
}

fn is_snowflake(token: &str) -> bool {
    (17..=19).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
}

/// Parses ids separated by commas and/or whitespace.
///
/// Tokens that are not 17-19 digit snowflakes are skipped. Duplicates are removed, keeping
/// the first occurrence.
pub fn parse_user_ids(raw: &str) -> Result<Vec<u64>, TargetError> {
    let mut ids: Vec<u64> = Vec::new();

    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if !is_snowflake(token) {
            continue;
        }
        // Zero is never a valid id and panics serenity's id constructors.
        if let Some(id) = token.parse::<u64>().ok().filter(|id| *id != 0) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    match ids.len() {
        0 => Err(TargetError::NoValidIds),
        n if n > MAX_BULK_TARGETS => Err(TargetError::TooMany(n)),
        _ => Ok(ids),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Ban { delete_days: u8 },
    Kick,
    AddRole(u64),
    RemoveRole(u64),
}

impl BulkAction {
    /// Action name stored on moderation cases.
    pub fn case_action(&self) -> &'static str {
        match self {
            Self::Ban { .. } => "ban",
            Self::Kick => "kick",
            Self::AddRole(_) => "role_add",
            Self::RemoveRole(_) => "role_remove",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl BulkOutcome {
    pub fn attempted(&self) -> usize {
        self.success + self.failed
    }

    pub fn record_failure(&mut self, target: impl std::fmt::Display, error: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("{}: {}", target, error));
    }

    pub fn color(&self) -> u32 {
        if self.failed > 0 {
            COLOR_PARTIAL
        } else {
            COLOR_SUCCESS
        }
    }

    /// First five errors, with a count of the rest.
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }

        let mut summary = self
            .errors
            .iter()
            .take(SHOWN_ERRORS)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if self.errors.len() > SHOWN_ERRORS {
            summary.push_str(&format!(
                "\n... and {} more",
                self.errors.len() - SHOWN_ERRORS
            ));
        }

        Some(summary)
    }

    /// Result embed; `unit` names what was acted on, e.g. "user" or "bot".
    pub fn to_embed(&self, title: &str, unit: &str) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(title)
            .color(self.color())
            .field("✅ Successful", format!("{} {}(s)", self.success, unit), true)
            .field("❌ Failed", format!("{} {}(s)", self.failed, unit), true)
            .field(
                "📋 Details",
                format!("Total attempted: {}", self.attempted()),
                true,
            )
            .timestamp(Timestamp::now());

        if let Some(errors) = self.error_summary() {
            embed = embed.field("⚠️ Errors", errors, false);
        }

        embed
    }
}

/// Bots other than this bot.
pub fn select_bots(members: &[Member], bot_user_id: u64) -> Vec<&Member> {
    members
        .iter()
        .filter(|m| m.user.bot && m.user.id.get() != bot_user_id)
        .collect()
}

/// Human members who joined after `cutoff`.
pub fn select_joined_after(members: &[Member], cutoff: DateTime<Utc>) -> Vec<&Member> {
    members
        .iter()
        .filter(|m| !m.user.bot)
        .filter(|m| {
            m.joined_at
                .is_some_and(|joined| joined.unix_timestamp() > cutoff.timestamp())
        })
        .collect()
}

pub struct ModerationService<'a> {
    db: &'a DatabaseConnection,
    http: &'a Http,
}

impl<'a> ModerationService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: &'a Http) -> Self {
        Self { db, http }
    }

    /// Applies `action` to each target in order, recording a case for each success.
    pub async fn run(
        &self,
        guild_id: u64,
        moderator_id: u64,
        targets: &[u64],
        action: BulkAction,
        reason: &str,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for &user_id in targets {
            match self.apply(guild_id, user_id, action, reason).await {
                Ok(()) => {
                    outcome.success += 1;
                    self.record_case(guild_id, user_id, moderator_id, action.case_action(), reason)
                        .await;
                }
                Err(e) => outcome.record_failure(user_id, e),
            }
        }

        tracing::info!(
            "Bulk {} in guild {} by {}: {} ok, {} failed",
            action.case_action(),
            guild_id,
            moderator_id,
            outcome.success,
            outcome.failed
        );

        outcome
    }

    /// Kicks the given members; failures are labelled with the member's tag.
    pub async fn kick_members(
        &self,
        guild_id: u64,
        moderator_id: u64,
        members: &[&Member],
        reason: &str,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for member in members {
            let user_id = member.user.id.get();
            match self.apply(guild_id, user_id, BulkAction::Kick, reason).await {
                Ok(()) => {
                    outcome.success += 1;
                    self.record_case(guild_id, user_id, moderator_id, "kick", reason)
                        .await;
                }
                Err(e) => outcome.record_failure(member.user.tag(), e),
            }
        }

        outcome
    }

    /// Fetches every member of the guild, page by page.
    pub async fn fetch_members(&self, guild_id: u64) -> Result<Vec<Member>, AppError> {
        let guild = GuildId::new(guild_id);
        let mut members: Vec<Member> = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild
                .members(self.http, Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let page_len = page.len() as u64;
            after = page.last().map(|m| m.user.id);
            members.extend(page);

            if page_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        Ok(members)
    }

    async fn apply(
        &self,
        guild_id: u64,
        user_id: u64,
        action: BulkAction,
        reason: &str,
    ) -> Result<(), AppError> {
        let guild = GuildId::new(guild_id);
        let user = UserId::new(user_id);

        match action {
            BulkAction::Ban { delete_days } => {
                guild
                    .ban_with_reason(self.http, user, delete_days.min(7), reason)
                    .await?
            }
            BulkAction::Kick => guild.kick_with_reason(self.http, user, reason).await?,
            BulkAction::AddRole(role) => {
                self.http
                    .add_member_role(guild, user, RoleId::new(role), Some(reason))
                    .await?
            }
            BulkAction::RemoveRole(role) => {
                self.http
                    .remove_member_role(guild, user, RoleId::new(role), Some(reason))
                    .await?
            }
        }

        Ok(())
    }

    async fn record_case(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        action: &str,
        reason: &str,
    ) {
        let param = CreateCaseParam {
            guild_id,
            user_id,
            moderator_id,
            action: action.to_string(),
            reason: Some(reason.to_string()),
        };

        if let Err(e) = ModerationCaseRepository::new(self.db).create(param).await {
            tracing::error!("Failed to record {} case in guild {}: {}", action, guild_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: u64, bot: bool, joined_at: &str) -> Member {
        serde_json::from_value(serde_json::json!({
            "guild_id": "1",
            "user": {
                "id": user_id.to_string(),
                "username": format!("user{}", user_id),
                "discriminator": "0",
                "global_name": null,
                "avatar": null,
                "bot": bot,
            },
            "roles": [],
            "joined_at": joined_at,
            "deaf": false,
            "mute": false,
            "flags": 0,
        }))
        .unwrap()
    }

    #[test]
    fn parses_mixed_separators() {
        let ids = parse_user_ids("123456789012345678, 223456789012345678\n323456789012345678").unwrap();

        assert_eq!(
            ids,
            vec![123456789012345678, 223456789012345678, 323456789012345678]
        );
    }

    #[test]
    fn skips_invalid_tokens_and_duplicates() {
        let ids = parse_user_ids(
            "<@123456789012345678> 12345 00000000000000000 123456789012345678 123456789012345678",
        )
        .unwrap();

        assert_eq!(ids, vec![123456789012345678]);
        assert_eq!(
            parse_user_ids("00000000000000000, 0000000000000000000"),
            Err(TargetError::NoValidIds)
        );
    }

    #[test]
    fn rejects_empty_and_oversized_lists() {
        assert_eq!(parse_user_ids("abc, 42"), Err(TargetError::NoValidIds));

        let many = (0..51)
            .map(|i| (100_000_000_000_000_000u64 + i).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(parse_user_ids(&many), Err(TargetError::TooMany(51)));
    }

    #[test]
    fn outcome_color_and_error_summary() {
        let mut outcome = BulkOutcome::default();
        outcome.success = 2;
        assert_eq!(outcome.color(), COLOR_SUCCESS);
        assert_eq!(outcome.error_summary(), None);

        for i in 0..7 {
            outcome.record_failure(i, "Missing Permissions");
        }

        assert_eq!(outcome.color(), COLOR_PARTIAL);
        assert_eq!(outcome.attempted(), 9);
        let summary = outcome.error_summary().unwrap();
        assert_eq!(summary.lines().count(), 6);
        assert!(summary.ends_with("... and 2 more"));
    }

    #[test]
    fn selects_other_bots_and_recent_humans() {
        let members = vec![
            member(1, true, "2024-01-01T00:00:00.000000+00:00"),
            member(2, true, "2024-01-01T00:00:00.000000+00:00"),
            member(3, false, "2024-01-01T00:00:00.000000+00:00"),
            member(4, false, "2024-06-01T12:00:00.000000+00:00"),
        ];

        let bots: Vec<u64> = select_bots(&members, 1)
            .iter()
            .map(|m| m.user.id.get())
            .collect();
        assert_eq!(bots, vec![2]);

        let cutoff = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let recent: Vec<u64> = select_joined_after(&members, cutoff)
            .iter()
            .map(|m| m.user.id.get())
            .collect();
        assert_eq!(recent, vec![4]);
    }
}
