//! DTOs shared between the dashboard API and its browser client.

pub mod api;
pub mod dashboard;
