//! Threat intelligence records.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use super::{parse_id, parse_optional_id};

pub const THREAT_NUKE_ATTEMPT: &str = "nuke_attempt";
pub const THREAT_PHISHING: &str = "phishing";
pub const THREAT_SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🟠",
            Self::Critical => "🔴",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Threat {
    pub id: i32,
    pub guild_id: u64,
    pub user_id: Option<u64>,
    pub threat_type: String,
    pub severity: Severity,
    /// JSON object with detector specific details.
    pub details: String,
    pub reported_at: DateTime<Utc>,
}

impl Threat {
    pub fn from_entity(entity: entity::threat::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            user_id: parse_optional_id("user_id", entity.user_id.as_deref())?,
            threat_type: entity.threat_type,
            severity: entity.severity.parse().map_err(DbErr::Custom)?,
            details: entity.details,
            reported_at: entity.reported_at,
        })
    }
}

/// Parameters for recording a new threat.
#[derive(Debug, Clone)]
pub struct CreateThreatParam {
    pub guild_id: u64,
    pub user_id: Option<u64>,
    pub threat_type: String,
    pub severity: Severity,
    pub details: serde_json::Value,
}
