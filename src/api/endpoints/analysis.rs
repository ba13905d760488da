//! Manual glucose analysis endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeForm, ApiContext};
use crate::models::AnalysisRequest;
use crate::pipeline::analysis::{AnalysisOutcome, ClassifiedAnalysis};

/// `POST /api/analyze`: run one analysis from the manual form.
///
/// Pipeline failures come back as the sentinel result with status 200.
/// Only a request overtaken by a newer one is answered with an error.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    body: Result<Json<AnalyzeForm>, JsonRejection>,
) -> Result<Json<ClassifiedAnalysis>, ApiError> {
    let Json(form) = body?;
    let request = AnalysisRequest::new(
        form.to_reading(chrono::Utc::now().timestamp()),
        form.to_context(),
    );

    match ctx.core.analyzer().submit(request).await {
        AnalysisOutcome::Completed(result) => Ok(Json(ClassifiedAnalysis::new(result))),
        AnalysisOutcome::Superseded { generation } => Err(ApiError::Superseded { generation }),
    }
}
