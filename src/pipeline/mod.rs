pub mod analysis;
pub mod telemetry;
