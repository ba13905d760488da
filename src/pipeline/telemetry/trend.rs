use serde::Serialize;

/// Relative change (of the current reading) below which a move is flat.
pub const TREND_THRESHOLD_RATIO: f64 = 0.02;

/// Direction of a metric between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Compare a reading against the previous one.
///
/// The threshold scales with the *current* value: a 1-unit move on a
/// reading of 2 is a trend, the same move on a reading of 200 is not.
/// No previous sample, or no change at all, is always flat.
pub fn detect_trend(current: f64, previous: Option<f64>) -> Trend {
    let Some(previous) = previous else {
        return Trend::Flat;
    };

    let diff = current - previous;
    let threshold = current.abs() * TREND_THRESHOLD_RATIO;

    if diff == 0.0 || diff.abs() < threshold {
        Trend::Flat
    } else if diff > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_change_is_flat() {
        // diff 2, threshold 2.04
        assert_eq!(detect_trend(102.0, Some(100.0)), Trend::Flat);
    }

    #[test]
    fn rise_above_threshold_is_up() {
        assert_eq!(detect_trend(110.0, Some(100.0)), Trend::Up);
    }

    #[test]
    fn drop_above_threshold_is_down() {
        assert_eq!(detect_trend(90.0, Some(100.0)), Trend::Down);
    }

    #[test]
    fn missing_previous_is_flat() {
        assert_eq!(detect_trend(50.0, None), Trend::Flat);
    }

    #[test]
    fn threshold_scales_with_current_value() {
        assert_eq!(detect_trend(2.0, Some(1.0)), Trend::Up);
        assert_eq!(detect_trend(200.0, Some(199.0)), Trend::Flat);
    }

    #[test]
    fn zero_previous_is_a_real_sample() {
        assert_eq!(detect_trend(1.5, Some(0.0)), Trend::Up);
    }

    #[test]
    fn unchanged_zero_is_flat() {
        assert_eq!(detect_trend(0.0, Some(0.0)), Trend::Flat);
    }

    #[test]
    fn falling_to_zero_is_down() {
        assert_eq!(detect_trend(0.0, Some(1.0)), Trend::Down);
    }
}
