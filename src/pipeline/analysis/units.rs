//! Acetone unit conversion between the entry form and the pipeline.
//!
//! The form displays acetone as ppm × 100; everything past the form
//! boundary (feed, prompt, tracker) works in canonical ppm.

/// Scale factor between the form's display value and ppm.
pub const ACETONE_DISPLAY_SCALE: f64 = 100.0;

/// Convert a form display value into canonical ppm.
///
/// Total: NaN and negative values pass through unchanged (scaled).
pub fn normalize_acetone(display_value: f64) -> f64 {
    display_value / ACETONE_DISPLAY_SCALE
}

/// Convert canonical ppm back into the form's display value.
pub fn to_display_acetone(ppm: f64) -> f64 {
    ppm * ACETONE_DISPLAY_SCALE
}
