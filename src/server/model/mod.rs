//! Server-side domain models and parameter types.
//!
//! Domain models are converted from entity models at the repository boundary, where string
//! ids stored in SQLite are parsed into `u64` snowflakes and string enums into Rust enums.
//! Services and bot handlers work only with these types.

pub mod activity;
pub mod antinuke;
pub mod guild;
pub mod guild_config;
pub mod moderation;
pub mod performance;
pub mod snapshot;
pub mod threat;
pub mod usage;
pub mod verification;

use sea_orm::DbErr;

/// Parses a snowflake stored as text, naming the column in the error.
pub(crate) fn parse_id(column: &str, value: &str) -> Result<u64, DbErr> {
    value
        .parse::<u64>()
        .map_err(|e| DbErr::Custom(format!("Failed to parse {}: {}", column, e)))
}

/// Parses an optional snowflake stored as text.
pub(crate) fn parse_optional_id(column: &str, value: Option<&str>) -> Result<Option<u64>, DbErr> {
    value.map(|v| parse_id(column, v)).transpose()
}
