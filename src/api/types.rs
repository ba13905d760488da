//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::models::{PatientContext, SensorReading, TestType};
use crate::pipeline::analysis::normalize_acetone;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

/// Manual analysis form as submitted by the UI.
///
/// Acetone arrives in display units (ppm × 100) and is normalized before
/// it reaches the pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeForm {
    pub heart_rate: f64,
    #[serde(rename = "spO2")]
    pub sp_o2: f64,
    pub acetone: f64,
    #[serde(default)]
    pub is_prediabetic: Option<bool>,
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl AnalyzeForm {
    pub fn to_reading(&self, timestamp: i64) -> SensorReading {
        SensorReading::new(
            self.heart_rate,
            self.sp_o2,
            normalize_acetone(self.acetone),
            timestamp,
        )
    }

    pub fn to_context(&self) -> PatientContext {
        PatientContext {
            is_prediabetic: self.is_prediabetic.unwrap_or(false),
            test_type: self
                .test_type
                .as_deref()
                .map(TestType::from_loose)
                .unwrap_or_default(),
            additional_info: self.additional_info.clone(),
        }
    }
}
