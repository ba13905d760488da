use serde::{Deserialize, Serialize};

use super::enums::{DiabetesRisk, GlucoseStatus, TestType};
use super::reading::SensorReading;

/// Message shown when an analysis could not be produced.
pub const ERROR_RECOMMENDATION: &str = "Error analyzing data. Please try again.";

/// Patient context supplied alongside each analysis request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    #[serde(default)]
    pub is_prediabetic: bool,
    #[serde(default)]
    pub test_type: TestType,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Unit of work for the prompt builder: one reading plus its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub reading: SensorReading,
    pub context: PatientContext,
}

impl AnalysisRequest {
    pub fn new(reading: SensorReading, context: PatientContext) -> Self {
        Self { reading, context }
    }
}

/// Typed glucose assessment returned by the reasoning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub glucose_estimate: String,
    pub glucose_range: String,
    pub glucose_status: GlucoseStatus,
    pub diabetes_risk: DiabetesRisk,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Well-formed stand-in returned when the pipeline fails.
    pub fn sentinel_error() -> Self {
        Self {
            glucose_estimate: "Error".into(),
            glucose_range: "Unable to estimate".into(),
            glucose_status: GlucoseStatus::Error,
            diabetes_risk: DiabetesRisk::Unknown,
            recommendations: vec![ERROR_RECOMMENDATION.into()],
        }
    }

    pub fn is_error(&self) -> bool {
        self.glucose_status == GlucoseStatus::Error
    }
}
