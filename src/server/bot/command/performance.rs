//! `/performance`: monitor diagnostics for the bot owner.

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateEmbed, CreateEmbedFooter, Permissions,
    Timestamp,
};

use super::reply_embed;
use crate::server::{
    error::AppError,
    service::performance::{HealthStatus, PerformanceStats, Priority},
    state::BotState,
    util::format::format_uptime,
};

pub const NAME: &str = "performance";

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Bot performance diagnostics (owner only)")
        .default_member_permissions(Permissions::ADMINISTRATOR)
}

pub fn is_owner(owner_id: Option<u64>, user_id: u64) -> bool {
    owner_id == Some(user_id)
}

pub async fn run(
    ctx: &Context,
    state: &BotState,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    if !is_owner(state.owner_id, command.user.id.get()) {
        return Err(AppError::BadRequest(
            "This command is restricted to the bot owner.".to_string(),
        ));
    }

    state.performance.sample_memory().await;
    let stats = state.performance.stats().await;

    reply_embed(ctx, command, stats_embed(&stats), true).await
}

fn health_color(status: HealthStatus) -> u32 {
    match status {
        HealthStatus::Healthy => 0x48bb78,
        HealthStatus::Degraded => 0xed8936,
        HealthStatus::Unhealthy => 0xff0000,
    }
}

pub fn stats_embed(stats: &PerformanceStats) -> CreateEmbed {
    let memory = stats
        .memory_mb
        .map(|mb| format!("{:.1} MB", mb))
        .unwrap_or_else(|| "n/a".to_string());

    let mut embed = CreateEmbed::new()
        .title("📊 Performance")
        .color(health_color(stats.health.status))
        .field(
            "Health",
            format!(
                "{} ({}/100)",
                stats.health.status.as_str(),
                stats.health.score
            ),
            true,
        )
        .field(
            "Uptime",
            format_uptime(stats.uptime.num_seconds().max(0) as u64),
            true,
        )
        .field("Memory", memory, true)
        .field(
            "Commands",
            format!("{} runs, avg {:.0} ms", stats.command_count, stats.avg_command_ms),
            true,
        )
        .field(
            "Queries",
            format!("{} runs, avg {:.0} ms", stats.query_count, stats.avg_query_ms),
            true,
        )
        .field(
            "Cache",
            format!(
                "{:.1}% hit rate ({} hits, {} misses)",
                stats.cache_hit_rate, stats.cache_hits, stats.cache_misses
            ),
            true,
        );

    if !stats.slowest_commands.is_empty() {
        let slowest = stats
            .slowest_commands
            .iter()
            .map(|t| format!("`/{}` {} ms", t.name, t.duration_ms))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("Slowest Commands", slowest, false);
    }

    if !stats.health.issues.is_empty() {
        embed = embed.field("Issues", stats.health.issues.join("\n"), false);
    }

    if !stats.recommendations.is_empty() {
        let recommendations = stats
            .recommendations
            .iter()
            .map(|r| {
                let marker = match r.priority {
                    Priority::High => "🔴",
                    Priority::Medium => "🟡",
                };
                format!("{} **{}:** {}", marker, r.area, r.message)
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("Recommendations", recommendations, false);
    }

    embed
        .footer(CreateEmbedFooter::new(format!(
            "{} events handled",
            stats.event_count
        )))
        .timestamp(Timestamp::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::performance::PerformanceMonitor;
    use serde_json::Value;

    #[test]
    fn only_the_configured_owner_passes() {
        assert!(is_owner(Some(5), 5));
        assert!(!is_owner(Some(5), 6));
        assert!(!is_owner(None, 5));
    }

    /// Tests the embed of a monitor with recorded commands.
    ///
    /// Expected: command count and slowest command shown
    #[tokio::test]
    async fn renders_recorded_commands() {
        let monitor = PerformanceMonitor::new();
        monitor.record_command("bulk", 120).await;
        monitor.record_command("config", 30).await;

        let embed: Value = serde_json::to_value(stats_embed(&monitor.stats().await)).unwrap();
        let fields = embed["fields"].as_array().unwrap();

        let commands = fields.iter().find(|f| f["name"] == "Commands").unwrap();
        assert_eq!(commands["value"], "2 runs, avg 75 ms");
        let slowest = fields
            .iter()
            .find(|f| f["name"] == "Slowest Commands")
            .unwrap();
        assert!(slowest["value"].as_str().unwrap().starts_with("`/bulk` 120 ms"));
    }
}
