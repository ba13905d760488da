use serde::Serialize;

use crate::models::SensorReading;
use crate::pipeline::analysis::to_display_acetone;

/// Decimal places kept when scaling acetone for display.
const DISPLAY_PRECISION: f64 = 1e6;

/// One-time form snapshot of a live reading ("use current reading").
///
/// Values are pre-formatted text as the form shows them; acetone is in
/// display units so submitting the draft unchanged round-trips to the
/// same ppm value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDraft {
    pub heart_rate: String,
    pub sp_o2: String,
    pub acetone: String,
}

impl AnalysisDraft {
    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            heart_rate: format!("{:.1}", reading.heart_rate),
            sp_o2: format!("{:.1}", reading.spo2),
            acetone: format_display_acetone(reading.acetone),
        }
    }
}

/// Display-unit acetone with the ×100 scaling noise rounded away.
fn format_display_acetone(ppm: f64) -> String {
    let display = (to_display_acetone(ppm) * DISPLAY_PRECISION).round() / DISPLAY_PRECISION;
    // -0.0 would print a sign
    (display + 0.0).to_string()
}
