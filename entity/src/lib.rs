pub mod prelude;

pub mod activity_stat;
pub mod antinuke_threshold;
pub mod antinuke_whitelist;
pub mod command_usage;
pub mod discord_guild;
pub mod guild_config;
pub mod guild_snapshot;
pub mod lockdown;
pub mod moderation_case;
pub mod pending_verification;
pub mod performance_metric;
pub mod threat;
