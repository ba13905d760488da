use serde::Serialize;

use crate::models::AnalysisResult;

/// Lower bound below which a range signals hypoglycemia risk (mg/dL).
pub const HYPOGLYCEMIA_THRESHOLD: f64 = 70.0;

/// Lower bound above which a range signals hyperglycemia risk (mg/dL).
pub const HYPERGLYCEMIA_THRESHOLD: f64 = 180.0;

/// Display band for an estimated glucose range.
///
/// Always derived locally from the range string, independent of the
/// model's own `glucoseStatus` / `diabetesRisk` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBand {
    Normal,
    Warning,
    Danger,
}

impl RangeBand {
    pub fn label(self) -> &'static str {
        match self {
            RangeBand::Normal => "Normal Range",
            RangeBand::Warning => "Low - Monitor Closely",
            RangeBand::Danger => "High - Take Action",
        }
    }

    /// Position on the low / normal / high gauge, 0-100.
    pub fn gauge_position(self) -> u8 {
        match self {
            RangeBand::Normal => 50,
            RangeBand::Warning => 25,
            RangeBand::Danger => 85,
        }
    }
}

/// Classify a `"LOW-HIGH mg/dL"` range by its lower bound.
///
/// A malformed range yields NaN, which compares false against both
/// thresholds and therefore lands on `Normal`.
pub fn classify_range(range: &str) -> RangeBand {
    let lower = lower_bound(range);
    if lower < HYPOGLYCEMIA_THRESHOLD {
        RangeBand::Warning
    } else if lower > HYPERGLYCEMIA_THRESHOLD {
        RangeBand::Danger
    } else {
        RangeBand::Normal
    }
}

/// Leading number of the text before the first `-`, NaN when absent.
fn lower_bound(range: &str) -> f64 {
    let head = range.split('-').next().unwrap_or("").trim_start();
    head[..float_prefix_len(head)].parse::<f64>().unwrap_or(f64::NAN)
}

/// Length of the longest prefix of `s` that reads as a decimal float:
/// optional `+`, digits with at most one `.`, then an optional exponent.
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let start = usize::from(bytes.first() == Some(&b'+'));
    let mut end = digits_from(start);
    let mut mantissa_digits = end - start;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Analysis result paired with its locally computed display band.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedAnalysis {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub band: RangeBand,
    pub band_label: &'static str,
    pub gauge_position: u8,
}

impl ClassifiedAnalysis {
    pub fn new(result: AnalysisResult) -> Self {
        let band = classify_range(&result.glucose_range);
        Self {
            result,
            band,
            band_label: band.label(),
            gauge_position: band.gauge_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_range_is_warning() {
        assert_eq!(classify_range("65-85 mg/dL"), RangeBand::Warning);
    }

    #[test]
    fn high_range_is_danger() {
        assert_eq!(classify_range("190-210 mg/dL"), RangeBand::Danger);
    }

    #[test]
    fn mid_range_is_normal() {
        assert_eq!(classify_range("90-110 mg/dL"), RangeBand::Normal);
    }

    #[test]
    fn malformed_range_falls_back_to_normal() {
        assert_eq!(classify_range("not-a-number mg/dL"), RangeBand::Normal);
        assert_eq!(classify_range("Unable to estimate"), RangeBand::Normal);
        assert_eq!(classify_range(""), RangeBand::Normal);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify_range("70-90 mg/dL"), RangeBand::Normal);
        assert_eq!(classify_range("180-200 mg/dL"), RangeBand::Normal);
        assert_eq!(classify_range("180.5-200 mg/dL"), RangeBand::Danger);
    }

    #[test]
    fn range_without_dash_uses_whole_prefix() {
        assert_eq!(classify_range("200"), RangeBand::Danger);
        assert_eq!(classify_range(" 60 "), RangeBand::Warning);
        assert_eq!(classify_range("200 mg/dL"), RangeBand::Danger);
    }

    #[test]
    fn lower_bound_reads_longest_float_prefix() {
        assert_eq!(lower_bound("1.5e2-160 mg/dL"), 150.0);
        assert_eq!(lower_bound("70.5.1-80"), 70.5);
        assert_eq!(lower_bound("2E1 mg/dL"), 20.0);
        assert_eq!(lower_bound("95e mg/dL"), 95.0);
        assert_eq!(lower_bound(".5-1"), 0.5);
        assert!(lower_bound(".-1").is_nan());
        assert_eq!(classify_range("1.5e2-160 mg/dL"), RangeBand::Normal);
        assert_eq!(classify_range("70.5.1-80 mg/dL"), RangeBand::Normal);
    }

    #[test]
    fn band_display_metadata() {
        assert_eq!(RangeBand::Warning.label(), "Low - Monitor Closely");
        assert_eq!(RangeBand::Danger.gauge_position(), 85);
        assert_eq!(RangeBand::Normal.gauge_position(), 50);
    }

    #[test]
    fn classified_analysis_flattens_result() {
        let mut result = AnalysisResult::sentinel_error();
        result.glucose_range = "200-220 mg/dL".into();
        let classified = ClassifiedAnalysis::new(result);
        assert_eq!(classified.band, RangeBand::Danger);

        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["glucoseRange"], "200-220 mg/dL");
        assert_eq!(json["band"], "danger");
        assert_eq!(json["bandLabel"], "High - Take Action");
        assert_eq!(json["gaugePosition"], 85);
    }
}
