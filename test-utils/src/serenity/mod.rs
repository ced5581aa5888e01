//! Fixtures for Serenity models.
//!
//! Serenity structs are `#[non_exhaustive]` and cannot be built with struct literals outside
//! the crate, so these fixtures deserialize them from JSON shaped like Discord's API payloads.
//!
//! ```rust,ignore
//! use test_utils::serenity::{create_test_guild, create_test_role};
//!
//! let guild = create_test_guild(123456789012345678, "Test Guild", None);
//! let admin = create_test_role(111111111111111111, "Admin", 0xFF0000, 10);
//! ```

pub mod activity;
pub mod channel;
pub mod guild;
pub mod role;

pub use activity::create_test_activity;
pub use channel::create_test_channel;
pub use guild::{create_test_guild, create_test_guild_with};
pub use role::{create_test_role, role_json};
