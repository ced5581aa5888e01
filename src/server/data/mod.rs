//! Database repository layer.
//!
//! Each repository wraps a borrowed `DatabaseConnection`, performs the queries for one table
//! and returns domain models from `server::model`. Rows are keyed by Discord snowflakes stored
//! as text; conversion to `u64` happens in the models' `from_entity` constructors.

pub mod activity_stat;
pub mod command_usage;
pub mod guild;
pub mod guild_config;
pub mod lockdown;
pub mod moderation_case;
pub mod performance_metric;
pub mod snapshot;
pub mod threat;
pub mod threshold;
pub mod verification;
pub mod whitelist;

#[cfg(test)]
mod test;
