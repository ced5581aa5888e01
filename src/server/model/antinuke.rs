//! Anti-nuke domain types: monitored action kinds, thresholds, whitelist and lockdown state.

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::DbErr;
use serenity::model::guild::audit_log::{
    Action, ChannelAction, EmojiAction, MemberAction, RoleAction, WebhookAction,
};

use super::parse_id;

/// Default sliding window for every action kind.
pub const DEFAULT_WINDOW_SECONDS: i64 = 10;
/// Widest window a guild may configure.
pub const MAX_WINDOW_SECONDS: i64 = 300;

/// Administrative action the detector counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ChannelCreate,
    ChannelDelete,
    RoleCreate,
    RoleDelete,
    WebhookCreate,
    WebhookDelete,
    EmojiCreate,
    EmojiDelete,
    MemberBan,
    MemberKick,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::ChannelCreate,
        ActionKind::ChannelDelete,
        ActionKind::RoleCreate,
        ActionKind::RoleDelete,
        ActionKind::WebhookCreate,
        ActionKind::WebhookDelete,
        ActionKind::EmojiCreate,
        ActionKind::EmojiDelete,
        ActionKind::MemberBan,
        ActionKind::MemberKick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelCreate => "channel_create",
            Self::ChannelDelete => "channel_delete",
            Self::RoleCreate => "role_create",
            Self::RoleDelete => "role_delete",
            Self::WebhookCreate => "webhook_create",
            Self::WebhookDelete => "webhook_delete",
            Self::EmojiCreate => "emoji_create",
            Self::EmojiDelete => "emoji_delete",
            Self::MemberBan => "member_ban",
            Self::MemberKick => "member_kick",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ChannelCreate => "Channel creations",
            Self::ChannelDelete => "Channel deletions",
            Self::RoleCreate => "Role creations",
            Self::RoleDelete => "Role deletions",
            Self::WebhookCreate => "Webhook creations",
            Self::WebhookDelete => "Webhook deletions",
            Self::EmojiCreate => "Emoji creations",
            Self::EmojiDelete => "Emoji deletions",
            Self::MemberBan => "Bans",
            Self::MemberKick => "Kicks",
        }
    }

    /// Threshold used when the guild has not configured one.
    pub fn default_threshold(&self) -> Threshold {
        let limit = match self {
            Self::ChannelDelete
            | Self::RoleDelete
            | Self::WebhookCreate
            | Self::WebhookDelete
            | Self::MemberBan => 3,
            Self::ChannelCreate | Self::RoleCreate | Self::EmojiDelete | Self::MemberKick => 5,
            Self::EmojiCreate => 8,
        };

        Threshold::new(limit, DEFAULT_WINDOW_SECONDS)
    }

    /// Maps an audit log action onto the kind it counts as, if it is monitored.
    pub fn from_audit_action(action: &Action) -> Option<Self> {
        match action {
            Action::Channel(ChannelAction::Create) => Some(Self::ChannelCreate),
            Action::Channel(ChannelAction::Delete) => Some(Self::ChannelDelete),
            Action::Role(RoleAction::Create) => Some(Self::RoleCreate),
            Action::Role(RoleAction::Delete) => Some(Self::RoleDelete),
            Action::Webhook(WebhookAction::Create) => Some(Self::WebhookCreate),
            Action::Webhook(WebhookAction::Delete) => Some(Self::WebhookDelete),
            Action::Emoji(EmojiAction::Create) => Some(Self::EmojiCreate),
            Action::Emoji(EmojiAction::Delete) => Some(Self::EmojiDelete),
            Action::Member(MemberAction::BanAdd) => Some(Self::MemberBan),
            Action::Member(MemberAction::Kick) => Some(Self::MemberKick),
            _ => None,
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum number of actions of one kind by one executor within `window`.
///
/// Reaching `limit` is a breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub limit: u32,
    pub window: TimeDelta,
}

impl Threshold {
    pub fn new(limit: u32, window_seconds: i64) -> Self {
        Self {
            limit: limit.max(1),
            window: TimeDelta::seconds(window_seconds.clamp(1, MAX_WINDOW_SECONDS)),
        }
    }

    pub fn window_seconds(&self) -> i64 {
        self.window.num_seconds()
    }

    pub fn from_entity(entity: &entity::antinuke_threshold::Model) -> Result<(ActionKind, Self), DbErr> {
        let kind = entity.action.parse().map_err(DbErr::Custom)?;
        Ok((
            kind,
            Self::new(entity.max_actions.max(1) as u32, entity.window_seconds as i64),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhitelistEntry {
    pub guild_id: u64,
    pub user_id: u64,
    pub added_by: u64,
    pub created_at: DateTime<Utc>,
}

impl WhitelistEntry {
    pub fn from_entity(entity: entity::antinuke_whitelist::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            user_id: parse_id("user_id", &entity.user_id)?,
            added_by: parse_id("added_by", &entity.added_by)?,
            created_at: entity.created_at,
        })
    }
}

/// An active lockdown and the `@everyone` permissions to restore afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LockdownState {
    pub guild_id: u64,
    pub reason: String,
    pub previous_permissions: u64,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LockdownState {
    pub fn from_entity(entity: entity::lockdown::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            reason: entity.reason,
            previous_permissions: entity.previous_permissions as u64,
            locked_at: entity.locked_at,
            expires_at: entity.expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
