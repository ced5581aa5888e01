//! Nexus backend: the Discord bot, its background jobs and the configuration dashboard.
//!
//! The bot and the dashboard run in one process and share a database connection, the guild
//! configuration cache and the performance monitor. The dashboard uses Axum, persistence
//! goes through SeaORM on Sqlite and the gateway connection is handled by Serenity.
//!
//! # Layers
//!
//! - **Controller Layer** (`controller/`) - dashboard HTTP handlers, access control and DTO conversion
//! - **Service Layer** (`service/`) - anti-nuke detection, lockdowns, backups, alerts and the other business logic
//! - **Data Layer** (`data/`) - database operations and entity-to-domain model conversion
//! - **Model Layer** (`model/`) - domain models and parameter types
//! - **Error Layer** (`error/`) - application error types and HTTP response mapping
//! - **Middleware** (`middleware/`) - dashboard sessions and guild permission guards
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - environment-based configuration
//! - **State** (`state`) - shared state for the dashboard and the bot
//! - **Startup** (`startup`) - database, session, HTTP client and service setup
//! - **Router** (`router`) - dashboard routes, rate limiting and API documentation
//! - **Scheduler** (`scheduler/`) - lockdown expiry, metric persistence, automatic backups and bot-list posting
//! - **Bot** (`bot/`) - gateway event handlers and slash commands
//!
//! # Event Flow
//!
//! Gateway events reach `bot::handler`, which loads the guild's configuration through
//! the cached config service and hands the event to a service. Services write threats,
//! violations and snapshots through the data layer and report to the guild's mod log and
//! the operator webhooks.

pub mod bot;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
