// Boundary checks on both ends of the analysis pipeline: caller input before
// prompt construction, and the model's JSON before it reaches the UI.

use serde_json::Value;

use super::parser::RawAnalysis;
use super::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult, DiabetesRisk, GlucoseStatus};

/// Recommendations beyond this count are dropped.
const MAX_RECOMMENDATIONS: usize = 5;

/// Fewer recommendations than this are accepted but logged.
const MIN_EXPECTED_RECOMMENDATIONS: usize = 3;

impl AnalysisRequest {
    /// Reject readings that are not physically meaningful.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_request(self)
    }
}

/// Reject readings outside the accepted domain before any prompt is built.
pub fn validate_request(request: &AnalysisRequest) -> Result<(), AnalysisError> {
    let reading = &request.reading;

    if !reading.heart_rate.is_finite() || reading.heart_rate <= 0.0 {
        return Err(AnalysisError::Validation(format!(
            "heart rate must be a positive number, got {}",
            reading.heart_rate
        )));
    }
    if !reading.spo2.is_finite() || !(0.0..=100.0).contains(&reading.spo2) {
        return Err(AnalysisError::Validation(format!(
            "SpO2 must be between 0 and 100, got {}",
            reading.spo2
        )));
    }
    if !reading.acetone.is_finite() || reading.acetone < 0.0 {
        return Err(AnalysisError::Validation(format!(
            "acetone must be a non-negative number, got {}",
            reading.acetone
        )));
    }
    Ok(())
}

/// Enforce the result contract on a parsed reply.
///
/// Either every field is present and well-typed or the whole reply is
/// rejected; a partially-populated result is never returned.
pub fn validate_raw_result(raw: RawAnalysis) -> Result<AnalysisResult, AnalysisError> {
    let glucose_estimate = required_text(raw.glucose_estimate, "glucoseEstimate")?;
    let glucose_range = required_text(raw.glucose_range, "glucoseRange")?;

    let status_text = required_text(raw.glucose_status, "glucoseStatus")?;
    let glucose_status = parse_glucose_status(&status_text)?;

    let risk_text = required_text(raw.diabetes_risk, "diabetesRisk")?;
    let diabetes_risk = parse_diabetes_risk(&risk_text)?;

    let recommendations = parse_recommendations(raw.recommendations)?;

    Ok(AnalysisResult {
        glucose_estimate,
        glucose_range,
        glucose_status,
        diabetes_risk,
        recommendations,
    })
}

fn required_text(value: Option<Value>, field: &str) -> Result<String, AnalysisError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(AnalysisError::Schema(format!("{field} is empty"))),
        Some(other) => Err(AnalysisError::Schema(format!(
            "{field} must be a string, got {}",
            json_type_name(&other)
        ))),
        None => Err(AnalysisError::Schema(format!("{field} is missing"))),
    }
}

/// The model may only report a real assessment; `error` is reserved for
/// the local sentinel.
fn parse_glucose_status(s: &str) -> Result<GlucoseStatus, AnalysisError> {
    match s.to_ascii_lowercase().as_str() {
        "normal" => Ok(GlucoseStatus::Normal),
        "prediabetic" => Ok(GlucoseStatus::Prediabetic),
        "diabetic" => Ok(GlucoseStatus::Diabetic),
        _ => Err(AnalysisError::Schema(format!(
            "glucoseStatus {s:?} is not one of normal|prediabetic|diabetic"
        ))),
    }
}

fn parse_diabetes_risk(s: &str) -> Result<DiabetesRisk, AnalysisError> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(DiabetesRisk::Low),
        "moderate" => Ok(DiabetesRisk::Moderate),
        "high" => Ok(DiabetesRisk::High),
        _ => Err(AnalysisError::Schema(format!(
            "diabetesRisk {s:?} is not one of low|moderate|high"
        ))),
    }
}

fn parse_recommendations(value: Option<Value>) -> Result<Vec<String>, AnalysisError> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(AnalysisError::Schema(format!(
                "recommendations must be an array, got {}",
                json_type_name(&other)
            )))
        }
        None => return Err(AnalysisError::Schema("recommendations is missing".into())),
    };

    let mut recommendations = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::String(s) if !s.trim().is_empty() => recommendations.push(s.trim().to_string()),
            other => {
                return Err(AnalysisError::Schema(format!(
                    "recommendations[{index}] must be a non-empty string, got {}",
                    json_type_name(&other)
                )))
            }
        }
    }

    if recommendations.is_empty() {
        return Err(AnalysisError::Schema("recommendations is empty".into()));
    }
    if recommendations.len() > MAX_RECOMMENDATIONS {
        tracing::warn!(
            count = recommendations.len(),
            kept = MAX_RECOMMENDATIONS,
            "Excess recommendations truncated"
        );
        recommendations.truncate(MAX_RECOMMENDATIONS);
    } else if recommendations.len() < MIN_EXPECTED_RECOMMENDATIONS {
        tracing::warn!(
            count = recommendations.len(),
            "Fewer recommendations than requested"
        );
    }

    Ok(recommendations)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
