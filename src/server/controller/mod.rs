pub mod auth;
pub mod page;
pub mod server;
pub mod stats;
