//! Cached access to guild configuration.
//!
//! Every message, presence update and audit log entry needs the guild's feature flags, so
//! configs are kept in memory after the first load. Cache hits and misses feed the
//! performance monitor.

use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::guild_config::GuildConfigRepository,
    error::AppError,
    model::guild_config::{ConfigUpdate, GuildConfig},
    service::performance::PerformanceMonitor,
};

#[derive(Clone)]
pub struct GuildConfigService {
    db: DatabaseConnection,
    cache: Arc<DashMap<u64, GuildConfig>>,
    performance: PerformanceMonitor,
}

impl GuildConfigService {
    pub fn new(db: DatabaseConnection, performance: PerformanceMonitor) -> Self {
        Self {
            db,
            cache: Arc::new(DashMap::new()),
            performance,
        }
    }

    /// Returns the guild's configuration, falling back to defaults for unknown guilds.
    pub async fn get(&self, guild_id: u64) -> Result<GuildConfig, AppError> {
        if let Some(config) = self.cache.get(&guild_id) {
            self.performance.record_cache_hit();
            return Ok(config.clone());
        }
        self.performance.record_cache_miss();

        let repo = GuildConfigRepository::new(&self.db);
        let config = self
            .performance
            .track_query("guild_config.get", repo.get_or_default(guild_id))
            .await?;

        self.cache.insert(guild_id, config.clone());

        Ok(config)
    }

    /// Applies a validated update and persists the whole row.
    pub async fn update(&self, guild_id: u64, update: ConfigUpdate) -> Result<GuildConfig, AppError> {
        let mut config = self.get(guild_id).await?;
        config.apply(update);

        let repo = GuildConfigRepository::new(&self.db);
        let saved = self
            .performance
            .track_query("guild_config.save", repo.save(&config))
            .await?;

        self.cache.insert(guild_id, saved.clone());

        Ok(saved)
    }

    /// Drops a guild from the cache, e.g. when the bot leaves it.
    pub fn invalidate(&self, guild_id: u64) {
        self.cache.remove(&guild_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::guild_config::{Feature, Punishment};
    use test_utils::{builder::TestBuilder, factory};

    /// Tests that a missing row yields the defaults and counts as a cache miss once.
    ///
    /// Expected: first call misses, second call hits
    #[tokio::test]
    async fn caches_default_config() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let performance = PerformanceMonitor::new();
        let service = GuildConfigService::new(db.clone(), performance.clone());

        let first = service.get(42).await?;
        let second = service.get(42).await?;

        assert_eq!(first.guild_id, 42);
        assert!(first.anti_nuke_enabled);
        assert_eq!(first.punishment, second.punishment);
        assert_eq!(performance.cache_hit_rate(), 50.0);

        Ok(())
    }

    /// Tests that updates are persisted and visible through the cache.
    ///
    /// Expected: a fresh service reads the saved values from the database
    #[tokio::test]
    async fn persists_updates() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        let service = GuildConfigService::new(db.clone(), PerformanceMonitor::new());
        service
            .update(guild_id, ConfigUpdate::Feature(Feature::PhishingFilter, false))
            .await?;
        service
            .update(guild_id, ConfigUpdate::Punishment(Punishment::Kick))
            .await?;

        let cached = service.get(guild_id).await?;
        assert!(!cached.phishing_filter_enabled);
        assert_eq!(cached.punishment, Punishment::Kick);

        let fresh = GuildConfigService::new(db.clone(), PerformanceMonitor::new());
        let stored = fresh.get(guild_id).await?;
        assert!(!stored.phishing_filter_enabled);
        assert_eq!(stored.punishment, Punishment::Kick);

        Ok(())
    }
}
