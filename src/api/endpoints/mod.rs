//! API endpoint handlers.

pub mod analysis;
pub mod health;
pub mod telemetry;
