//! Discord bot: slash commands and gateway event handlers.
//!
//! The client is built in `main` before anything else needs Discord, so its HTTP client,
//! cache and shard manager can be handed to the dashboard and the scheduler. The client
//! itself then runs in a separate tokio task.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - guild availability, channel and role events
//! - `GUILD_MESSAGES` and `MESSAGE_CONTENT` - phishing filter
//! - `GUILD_MEMBERS` - member cache for bulk moderation and role hierarchy checks
//! - `GUILD_MODERATION` - audit log entries feeding the anti-nuke detector
//! - `GUILD_EMOJIS_AND_STICKERS` and `GUILD_WEBHOOKS` - mod log lifecycle events
//! - `GUILD_PRESENCES` - presence verification, status roles and activity analytics
//!
//! `GUILD_MEMBERS`, `GUILD_PRESENCES` and `MESSAGE_CONTENT` are privileged and must be
//! enabled in the Discord Developer Portal.

pub mod command;
pub mod handler;
pub mod start;
