//! Factory for `command_usage` rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_snowflake;

pub struct CommandUsageFactory<'a> {
    db: &'a DatabaseConnection,
    command: String,
    guild_id: Option<String>,
    duration_ms: i64,
    success: bool,
    used_at: DateTime<Utc>,
}

impl<'a> CommandUsageFactory<'a> {
    /// Defaults: a successful 50 ms `threatdashboard` call made now outside any guild.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            command: "threatdashboard".to_string(),
            guild_id: None,
            duration_ms: 50,
            success: true,
            used_at: Utc::now(),
        }
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn used_at(mut self, used_at: DateTime<Utc>) -> Self {
        self.used_at = used_at;
        self
    }

    pub async fn build(self) -> Result<entity::command_usage::Model, DbErr> {
        entity::command_usage::ActiveModel {
            command: ActiveValue::Set(self.command),
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(next_snowflake()),
            duration_ms: ActiveValue::Set(self.duration_ms),
            success: ActiveValue::Set(self.success),
            used_at: ActiveValue::Set(self.used_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_command_usage(
    db: &DatabaseConnection,
    used_at: DateTime<Utc>,
) -> Result<entity::command_usage::Model, DbErr> {
    CommandUsageFactory::new(db).used_at(used_at).build().await
}
