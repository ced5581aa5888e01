//! Nexus Test Utils
//!
//! Shared testing utilities for the Nexus bot. Provides a builder for test contexts backed by
//! in-memory SQLite databases, factories for seeding rows, and fixtures for Serenity models.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring the tables a test needs
//! - **TestContext**: Test environment holding the database connection and session
//! - **TestError**: Errors that can occur during test setup
//! - **factory**: Row factories with sensible defaults
//! - **serenity**: Serenity models deserialized from Discord-shaped JSON
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn stores_threat() -> Result<(), sea_orm::DbErr> {
//!     let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
//!     let db = test.db.as_ref().unwrap();
//!
//!     let guild = factory::create_guild(db).await?;
//!     // Exercise repositories against `db`...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod serenity;
