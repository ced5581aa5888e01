//! Factory methods for creating test data.
//!
//! Each table has a factory module with a `*Factory` builder for customization and a
//! `create_*` function for quick default creation. Factories that reference a guild take the
//! guild id so that foreign keys line up with a row made by `create_guild`.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let guild = factory::create_guild(&db).await?;
//! let threat = factory::threat::ThreatFactory::new(&db, &guild.guild_id)
//!     .severity("critical")
//!     .build()
//!     .await?;
//! ```

pub mod command_usage;
pub mod discord_guild;
pub mod guild_config;
pub mod helpers;
pub mod moderation_case;
pub mod threat;
pub mod whitelist;

pub use command_usage::create_command_usage;
pub use discord_guild::create_guild;
pub use guild_config::create_guild_config;
pub use helpers::{create_guild_with_config, next_id};
pub use moderation_case::create_moderation_case;
pub use threat::create_threat;
pub use whitelist::create_whitelist_entry;
