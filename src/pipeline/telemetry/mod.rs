//! Live biometric telemetry: push feed, two-slot tracker, trend detection,
//! and the form draft taken from the newest reading.

pub mod draft;
pub mod feed;
pub mod tracker;
pub mod trend;

pub use draft::*;
pub use feed::*;
pub use tracker::*;
pub use trend::*;
