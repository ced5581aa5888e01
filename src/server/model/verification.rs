use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use super::{parse_id, parse_optional_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKind {
    /// The member proves they are human by putting the code in their custom status.
    Presence,
}

impl VerificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
        }
    }
}

impl FromStr for VerificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presence" => Ok(Self::Presence),
            other => Err(format!("unknown verification kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingVerification {
    pub guild_id: u64,
    pub user_id: u64,
    pub kind: VerificationKind,
    pub code: String,
    pub verified_role_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn from_entity(entity: entity::pending_verification::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            user_id: parse_id("user_id", &entity.user_id)?,
            kind: entity.kind.parse().map_err(DbErr::Custom)?,
            code: entity.code,
            verified_role_id: parse_optional_id(
                "verified_role_id",
                entity.verified_role_id.as_deref(),
            )?,
            created_at: entity.created_at,
        })
    }
}
