use serde::Deserialize;

use super::validation::validate_raw_result;
use super::AnalysisError;
use crate::models::AnalysisResult;

/// Parse the model's free-form reply into a validated result.
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult, AnalysisError> {
    let json_str = extract_json_object(response)?;
    let raw: RawAnalysis = serde_json::from_str(json_str)
        .map_err(|e| AnalysisError::JsonParsing(e.to_string()))?;
    validate_raw_result(raw)
}

/// Shape of the reply before schema checks. Fields stay as loose JSON
/// values so type mismatches surface as schema errors, not parse errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub glucose_estimate: Option<serde_json::Value>,
    pub glucose_range: Option<serde_json::Value>,
    pub glucose_status: Option<serde_json::Value>,
    pub diabetes_risk: Option<serde_json::Value>,
    pub recommendations: Option<serde_json::Value>,
}

/// Locate the first balanced `{...}` span in the response.
///
/// Counts nesting depth and ignores braces inside JSON string literals,
/// so prose before or after the object (or a ```json fence) is tolerated.
pub fn extract_json_object(response: &str) -> Result<&str, AnalysisError> {
    let start = response
        .find('{')
        .ok_or_else(|| AnalysisError::MalformedResponse("No JSON object found".into()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in response[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&response[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(AnalysisError::MalformedResponse(
        "Unbalanced JSON object".into(),
    ))
}
