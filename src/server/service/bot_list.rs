//! Server count posting to third-party bot lists.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::server::error::AppError;

/// Minimum spacing between two posts to the same list.
pub const MIN_POST_INTERVAL_SECS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotList {
    TopGg,
    DiscordBotList,
    VoidBots,
}

impl BotList {
    pub const ALL: [BotList; 3] = [BotList::TopGg, BotList::DiscordBotList, BotList::VoidBots];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopGg => "Top.gg",
            Self::DiscordBotList => "DiscordBotList",
            Self::VoidBots => "Void Bots",
        }
    }

    pub fn stats_url(&self, bot_id: u64) -> String {
        match self {
            Self::TopGg => format!("https://top.gg/api/bots/{}/stats", bot_id),
            Self::DiscordBotList => {
                format!("https://discordbotlist.com/api/v1/bots/{}/stats", bot_id)
            }
            Self::VoidBots => format!("https://api.voidbots.net/bot/stats/{}", bot_id),
        }
    }

    /// How often the scheduler posts to this list.
    pub fn interval_minutes(&self) -> u64 {
        match self {
            Self::TopGg | Self::VoidBots => 30,
            Self::DiscordBotList => 60,
        }
    }

    pub fn payload(&self, stats: &BotStats) -> Value {
        match self {
            Self::TopGg | Self::VoidBots => json!({
                "server_count": stats.server_count,
                "shard_count": stats.shard_count,
            }),
            Self::DiscordBotList => json!({
                "guilds": stats.server_count,
                "users": stats.user_count,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStats {
    pub server_count: u64,
    pub shard_count: u32,
    pub user_count: u64,
}

/// Spacing guard for one list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostGate {
    last_post: Option<DateTime<Utc>>,
}

impl PostGate {
    /// Seconds left until a post is allowed, or `None` when one may go out now.
    pub fn wait_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        let last = self.last_post?;
        let elapsed = now - last;
        let min = Duration::seconds(MIN_POST_INTERVAL_SECS);

        (elapsed < min).then(|| (min - elapsed).num_seconds().max(1))
    }

    /// Restarts the cooldown; called after a successful post and after a 429.
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_post = Some(now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostResult {
    Posted,
    NoToken,
    Cooldown { wait_secs: i64 },
    RateLimited,
}

/// Posts stats to every list that has a token. Cheap to clone.
#[derive(Clone)]
pub struct BotListService {
    http_client: reqwest::Client,
    tokens: Arc<HashMap<BotList, String>>,
    gates: Arc<Mutex<HashMap<BotList, PostGate>>>,
}

impl BotListService {
    pub fn new(http_client: reqwest::Client, tokens: HashMap<BotList, String>) -> Self {
        Self {
            http_client,
            tokens: Arc::new(tokens),
            gates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn configured(&self) -> Vec<BotList> {
        BotList::ALL
            .into_iter()
            .filter(|list| self.tokens.contains_key(list))
            .collect()
    }

    pub async fn post(
        &self,
        list: BotList,
        bot_id: u64,
        stats: &BotStats,
        now: DateTime<Utc>,
    ) -> Result<PostResult, AppError> {
        let Some(token) = self.tokens.get(&list) else {
            return Ok(PostResult::NoToken);
        };

        // Held across the request so overlapping jobs cannot double post.
        let mut gates = self.gates.lock().await;
        let gate = gates.entry(list).or_default();

        if let Some(wait_secs) = gate.wait_secs(now) {
            tracing::debug!("{} rate limited, skipping post (wait {}s)", list.name(), wait_secs);
            return Ok(PostResult::Cooldown { wait_secs });
        }

        let response = self
            .http_client
            .post(list.stats_url(bot_id))
            .header(reqwest::header::AUTHORIZATION, token)
            .json(&list.payload(stats))
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            gate.mark(now);
            tracing::warn!(
                "{} rate limited the stats post, retrying in {} minutes",
                list.name(),
                MIN_POST_INTERVAL_SECS / 60
            );
            return Ok(PostResult::RateLimited);
        }

        response.error_for_status()?;
        gate.mark(now);

        tracing::info!(
            "Posted stats to {}: {} servers, {} shards",
            list.name(),
            stats.server_count,
            stats.shard_count
        );

        Ok(PostResult::Posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: BotStats = BotStats {
        server_count: 120,
        shard_count: 2,
        user_count: 45_000,
    };

    #[test]
    fn payloads_match_each_list() {
        assert_eq!(
            BotList::TopGg.payload(&STATS),
            json!({ "server_count": 120, "shard_count": 2 })
        );
        assert_eq!(
            BotList::DiscordBotList.payload(&STATS),
            json!({ "guilds": 120, "users": 45_000 })
        );
        assert_eq!(
            BotList::VoidBots.stats_url(42),
            "https://api.voidbots.net/bot/stats/42"
        );
    }

    /// Tests the spacing guard.
    ///
    /// Expected: posts blocked for three minutes after a mark
    #[test]
    fn gate_enforces_minimum_spacing() {
        let now = Utc::now();
        let mut gate = PostGate::default();
        assert_eq!(gate.wait_secs(now), None);

        gate.mark(now);

        assert_eq!(gate.wait_secs(now + Duration::seconds(60)), Some(120));
        assert_eq!(gate.wait_secs(now + Duration::seconds(180)), None);
    }

    #[tokio::test]
    async fn lists_without_token_are_skipped() -> Result<(), AppError> {
        let service = BotListService::new(
            reqwest::Client::new(),
            HashMap::from([(BotList::VoidBots, "token".to_string())]),
        );

        let result = service.post(BotList::TopGg, 1, &STATS, Utc::now()).await?;

        assert_eq!(result, PostResult::NoToken);
        assert_eq!(service.configured(), vec![BotList::VoidBots]);

        Ok(())
    }

    #[tokio::test]
    async fn cooldown_skips_without_request() -> Result<(), AppError> {
        let service = BotListService::new(
            reqwest::Client::new(),
            HashMap::from([(BotList::VoidBots, "token".to_string())]),
        );
        let now = Utc::now();
        service
            .gates
            .lock()
            .await
            .entry(BotList::VoidBots)
            .or_default()
            .mark(now);

        let result = service
            .post(BotList::VoidBots, 1, &STATS, now + Duration::seconds(30))
            .await?;

        assert_eq!(result, PostResult::Cooldown { wait_secs: 150 });

        Ok(())
    }
}
