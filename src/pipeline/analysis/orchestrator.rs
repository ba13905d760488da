use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::parser::parse_analysis_response;
use super::prompt::build_analysis_prompt;
use super::types::LlmClient;
use super::AnalysisError;
use crate::analysis_service::AnalysisCoordinator;
use crate::models::{AnalysisRequest, AnalysisResult, PatientContext, SensorReading, TestType};

/// Outcome of a latest-wins analysis submission.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The analysis finished and is still the newest request.
    Completed(AnalysisResult),
    /// A newer request started before this one finished; its result was dropped.
    Superseded { generation: u64 },
}

/// Orchestrates the glucose analysis pipeline:
/// validate → prompt → reasoning service → parse/validate → result
pub struct HealthAnalyzer {
    llm: Arc<dyn LlmClient>,
    deadline: Duration,
    coordinator: AnalysisCoordinator,
}

impl HealthAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, deadline: Duration) -> Self {
        Self {
            llm,
            deadline,
            coordinator: AnalysisCoordinator::new(),
        }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn coordinator(&self) -> &AnalysisCoordinator {
        &self.coordinator
    }

    /// Public entry point. Never fails: any internal error is logged and
    /// replaced by the sentinel error result.
    ///
    /// `acetone` is canonical ppm; callers holding a form value must run it
    /// through `normalize_acetone` first.
    pub async fn analyze_health_data(
        &self,
        heart_rate: f64,
        spo2: f64,
        acetone: f64,
        is_prediabetic: Option<bool>,
        test_type: Option<TestType>,
        additional_info: Option<String>,
    ) -> AnalysisResult {
        let request = AnalysisRequest::new(
            SensorReading::new(heart_rate, spo2, acetone, chrono::Utc::now().timestamp()),
            PatientContext {
                is_prediabetic: is_prediabetic.unwrap_or(false),
                test_type: test_type.unwrap_or_default(),
                additional_info,
            },
        );
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id);
        let result = self
            .run(&request, &CancellationToken::new())
            .instrument(span.clone())
            .await;
        span.in_scope(|| collapse_to_sentinel(result))
    }

    /// Latest-wins submission: starting a new analysis cancels the previous
    /// one, and a result that finishes after a newer request began is
    /// discarded instead of returned.
    pub async fn submit(&self, request: AnalysisRequest) -> AnalysisOutcome {
        let ticket = self.coordinator.begin();
        let span = tracing::info_span!(
            "analyze",
            request_id = %ticket.request_id,
            generation = ticket.generation
        );

        let result = self
            .run(&request, ticket.cancellation())
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        if !ticket.is_current() {
            tracing::info!(
                latest = self.coordinator.latest_generation(),
                "Discarding stale analysis result"
            );
            return AnalysisOutcome::Superseded {
                generation: ticket.generation,
            };
        }
        AnalysisOutcome::Completed(collapse_to_sentinel(result))
    }

    /// Run the typed pipeline once. Errors are returned, not collapsed.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        request.validate()?;

        let prompt = build_analysis_prompt(request);
        tracing::debug!(
            prompt_len = prompt.len(),
            test_type = %request.context.test_type,
            model = self.llm.model(),
            "Invoking reasoning service"
        );

        let raw = self.invoke(&prompt, cancel).await?;
        tracing::debug!(response_len = raw.len(), "Reasoning service responded");

        let result = parse_analysis_response(&raw)?;
        tracing::info!(
            status = %result.glucose_status,
            risk = %result.diabetes_risk,
            recommendations = result.recommendations.len(),
            "Analysis complete"
        );
        Ok(result)
    }

    /// Single attempt against the reasoning service, bounded by the
    /// configured deadline and the cancellation token.
    async fn invoke(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, AnalysisError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            outcome = tokio::time::timeout(self.deadline, self.llm.generate(prompt)) => {
                outcome.map_err(|_| AnalysisError::ServiceTimeout(self.deadline))?
            }
        }
    }
}

/// Convert a pipeline error into the sentinel result, logging its kind.
fn collapse_to_sentinel(result: Result<AnalysisResult, AnalysisError>) -> AnalysisResult {
    match result {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(kind = e.kind().as_str(), error = %e, "Analysis failed");
            AnalysisResult::sentinel_error()
        }
    }
}
