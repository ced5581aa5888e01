//! Business logic between the bot/dashboard entry points and the data layer.
//!
//! Services that hold in-memory state (`GuildConfigService`, `ActionTracker`,
//! `PerformanceMonitor`, ...) are cheap to clone and shared through `BotState` and
//! `AppState`. Stateless services borrow the database connection and Discord HTTP client
//! for the duration of one operation.

pub mod alert;
pub mod analytics;
pub mod antinuke;
pub mod auth;
pub mod backup;
pub mod bot_list;
pub mod guild_config;
pub mod integrity;
pub mod lifecycle;
pub mod moderation;
pub mod modlog;
pub mod performance;
pub mod presence;
pub mod stats;
pub mod threat_dashboard;
