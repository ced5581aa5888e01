use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable database schemas.
///
/// Add the entity tables a test touches, then call `build()` to get a `TestContext` with an
/// in-memory SQLite database containing exactly those tables.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
/// use entity::prelude::{DiscordGuild, Threat};
///
/// let test = TestBuilder::new()
///     .with_table(DiscordGuild)
///     .with_table(Threat)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// CREATE TABLE statements executed in insertion order during `build()`.
    tables: Vec<TableCreateStatement>,
}

impl TestBuilder {
    /// Creates a new test builder with no tables configured.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds an entity table to the test database schema.
    ///
    /// Tables with foreign keys must be added after the tables they reference.
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity to create a table for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds the guild table and every table keyed to it by foreign key.
    ///
    /// Covers `DiscordGuild`, `GuildConfig`, `AntiNukeWhitelist`, `AntiNukeThreshold`,
    /// `Lockdown`, `GuildSnapshot` and `PendingVerification`.
    pub fn with_guild_tables(self) -> Self {
        self.with_table(DiscordGuild)
            .with_table(GuildConfig)
            .with_table(AntiNukeWhitelist)
            .with_table(AntiNukeThreshold)
            .with_table(Lockdown)
            .with_table(GuildSnapshot)
            .with_table(PendingVerification)
    }

    /// Adds the append-only log tables used by dashboards and analytics.
    ///
    /// Covers `Threat`, `ModerationCase`, `CommandUsage`, `ActivityStat` and
    /// `PerformanceMetric`. None of them reference other tables.
    pub fn with_log_tables(self) -> Self {
        self.with_table(Threat)
            .with_table(ModerationCase)
            .with_table(CommandUsage)
            .with_table(ActivityStat)
            .with_table(PerformanceMetric)
    }

    /// Builds the test context, creating all configured tables.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with database and tables ready
    /// - `Err(TestError::Database)` - Failed to connect or create tables
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
