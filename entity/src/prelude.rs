pub use super::activity_stat::Entity as ActivityStat;
pub use super::antinuke_threshold::Entity as AntiNukeThreshold;
pub use super::antinuke_whitelist::Entity as AntiNukeWhitelist;
pub use super::command_usage::Entity as CommandUsage;
pub use super::discord_guild::Entity as DiscordGuild;
pub use super::guild_config::Entity as GuildConfig;
pub use super::guild_snapshot::Entity as GuildSnapshot;
pub use super::lockdown::Entity as Lockdown;
pub use super::moderation_case::Entity as ModerationCase;
pub use super::pending_verification::Entity as PendingVerification;
pub use super::performance_metric::Entity as PerformanceMetric;
pub use super::threat::Entity as Threat;
