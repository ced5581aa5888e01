//! Process-wide bot statistics for the dashboard and bot-list posting.

use std::time::Duration;

use serenity::{cache::Cache, gateway::ShardManager};

use crate::{
    model::dashboard::BotStatsDto,
    server::service::{bot_list::BotStats, performance::current_memory_mb},
};

/// Guild and member counts from the gateway cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounts {
    pub servers: usize,
    pub users: u64,
}

impl CacheCounts {
    pub fn from_cache(cache: &Cache) -> Self {
        let guilds = cache.guilds();
        let users = guilds
            .iter()
            .filter_map(|id| cache.guild(*id).map(|g| g.member_count))
            .sum();

        Self {
            servers: guilds.len(),
            users,
        }
    }
}

/// Mean of the known latencies in whole milliseconds.
pub fn average_latency_ms(latencies: &[Duration]) -> Option<u64> {
    if latencies.is_empty() {
        return None;
    }

    let total: u128 = latencies.iter().map(Duration::as_millis).sum();
    Some((total / latencies.len() as u128) as u64)
}

/// Heartbeat latency averaged over every running shard.
pub async fn shard_latency_ms(shard_manager: &ShardManager) -> Option<u64> {
    let runners = shard_manager.runners.lock().await;
    let latencies: Vec<Duration> = runners.values().filter_map(|r| r.latency).collect();

    average_latency_ms(&latencies)
}

pub async fn shard_count(shard_manager: &ShardManager) -> u32 {
    shard_manager.runners.lock().await.len().max(1) as u32
}

pub fn dashboard_stats(counts: CacheCounts, uptime_secs: u64, ping: Option<u64>) -> BotStatsDto {
    BotStatsDto {
        servers: counts.servers,
        users: counts.users,
        uptime: uptime_secs,
        ping,
        memory: current_memory_mb().map(|mb| mb.round() as u64).unwrap_or(0),
    }
}

pub fn bot_list_stats(counts: CacheCounts, shard_count: u32) -> BotStats {
    BotStats {
        server_count: counts.servers as u64,
        shard_count,
        user_count: counts.users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_known_latencies() {
        assert_eq!(average_latency_ms(&[]), None);
        assert_eq!(
            average_latency_ms(&[Duration::from_millis(40), Duration::from_millis(61)]),
            Some(50)
        );
    }

    #[test]
    fn converts_counts_for_bot_lists() {
        let stats = bot_list_stats(
            CacheCounts {
                servers: 12,
                users: 3400,
            },
            2,
        );

        assert_eq!(stats.server_count, 12);
        assert_eq!(stats.shard_count, 2);
        assert_eq!(stats.user_count, 3400);
    }

    #[test]
    fn empty_cache_has_no_guilds() {
        let cache = Cache::new();

        assert_eq!(CacheCounts::from_cache(&cache), CacheCounts::default());
    }
}
