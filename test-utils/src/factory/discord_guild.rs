//! Factory for `discord_guild` rows.

use crate::factory::helpers::{next_id, next_snowflake};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Builder for test guild rows.
///
/// ```rust,ignore
/// let guild = DiscordGuildFactory::new(&db)
///     .guild_id("987654321987654321")
///     .owner_id("111111111111111111")
///     .build()
///     .await?;
/// ```
pub struct DiscordGuildFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    name: String,
    owner_id: String,
    member_count: i64,
}

impl<'a> DiscordGuildFactory<'a> {
    /// Defaults: a unique snowflake id, `"Guild {n}"`, a unique owner, 100 members.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: next_snowflake(),
            name: format!("Guild {}", next_id()),
            owner_id: next_snowflake(),
            member_count: 100,
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn member_count(mut self, member_count: i64) -> Self {
        self.member_count = member_count;
        self
    }

    pub async fn build(self) -> Result<entity::discord_guild::Model, DbErr> {
        entity::discord_guild::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            name: ActiveValue::Set(self.name),
            icon_hash: ActiveValue::Set(None),
            owner_id: ActiveValue::Set(self.owner_id),
            member_count: ActiveValue::Set(self.member_count),
            last_seen_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a guild with default values.
pub async fn create_guild(db: &DatabaseConnection) -> Result<entity::discord_guild::Model, DbErr> {
    DiscordGuildFactory::new(db).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;
    use entity::prelude::*;

    #[tokio::test]
    async fn creates_guild_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(DiscordGuild)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let guild = create_guild(db).await?;

        assert_eq!(guild.guild_id.len(), 18);
        assert_eq!(guild.member_count, 100);

        Ok(())
    }

    #[tokio::test]
    async fn creates_multiple_unique_guilds() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_table(DiscordGuild)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let first = create_guild(db).await?;
        let second = create_guild(db).await?;

        assert_ne!(first.guild_id, second.guild_id);

        Ok(())
    }
}
