//! Factory for `threat` rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_snowflake;

/// Builder for threat intelligence rows.
///
/// Defaults: a `nuke_attempt` of severity `high` reported now by a unique user.
pub struct ThreatFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    user_id: Option<String>,
    threat_type: String,
    severity: String,
    details: String,
    reported_at: DateTime<Utc>,
}

impl<'a> ThreatFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, guild_id: &str) -> Self {
        Self {
            db,
            guild_id: guild_id.to_string(),
            user_id: Some(next_snowflake()),
            threat_type: "nuke_attempt".to_string(),
            severity: "high".to_string(),
            details: "{}".to_string(),
            reported_at: Utc::now(),
        }
    }

    pub fn user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn threat_type(mut self, threat_type: impl Into<String>) -> Self {
        self.threat_type = threat_type.into();
        self
    }

    pub fn severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn reported_at(mut self, reported_at: DateTime<Utc>) -> Self {
        self.reported_at = reported_at;
        self
    }

    pub async fn build(self) -> Result<entity::threat::Model, DbErr> {
        entity::threat::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(self.user_id),
            threat_type: ActiveValue::Set(self.threat_type),
            severity: ActiveValue::Set(self.severity),
            details: ActiveValue::Set(self.details),
            reported_at: ActiveValue::Set(self.reported_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_threat(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<entity::threat::Model, DbErr> {
    ThreatFactory::new(db, guild_id).build().await
}
