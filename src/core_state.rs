//! Transport-agnostic application state.
//!
//! `CoreState` is shared by every HTTP handler and WebSocket session.
//! It owns the analysis pipeline, the telemetry feed and the trend tracker.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::SensorReading;
use crate::pipeline::analysis::{AnalysisError, GeminiClient, HealthAnalyzer, LlmClient};
use crate::pipeline::telemetry::{
    AnalysisDraft, TelemetryFeed, TelemetrySnapshot, TelemetrySubscription, TrendTracker,
    HEALTH_DATA_KEY,
};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    analyzer: HealthAnalyzer,
    feed: TelemetryFeed,
    /// Updated before each publish so subscribers always find the
    /// snapshot matching the reading that woke them.
    tracker: Mutex<TrendTracker>,
}

impl CoreState {
    /// Build state backed by the hosted reasoning service.
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let client = GeminiClient::new(&config.api_base, &config.api_key, &config.model)?;
        tracing::info!(model = %config.model, base = %config.api_base, "Reasoning service configured");
        Ok(Self::with_client(Arc::new(client), config.request_timeout))
    }

    pub fn with_client(llm: Arc<dyn LlmClient>, deadline: Duration) -> Self {
        Self {
            analyzer: HealthAnalyzer::new(llm, deadline),
            feed: TelemetryFeed::new(),
            tracker: Mutex::new(TrendTracker::new()),
        }
    }

    pub fn analyzer(&self) -> &HealthAnalyzer {
        &self.analyzer
    }

    pub fn feed(&self) -> &TelemetryFeed {
        &self.feed
    }

    fn lock_tracker(&self) -> Result<MutexGuard<'_, TrendTracker>, CoreError> {
        self.tracker.lock().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Telemetry ───────────────────────────────────────────

    /// Accept a reading from the device transport.
    ///
    /// The tracker lock is held across the publish so concurrent ingests
    /// reach subscribers in the same order they reached the tracker.
    pub fn ingest(&self, reading: SensorReading) -> Result<TelemetrySnapshot, CoreError> {
        let mut tracker = self.lock_tracker()?;
        let snapshot = tracker.observe(reading);
        self.feed.publish(HEALTH_DATA_KEY, reading);
        Ok(snapshot)
    }

    pub fn telemetry_snapshot(&self) -> Result<Option<TelemetrySnapshot>, CoreError> {
        Ok(self.lock_tracker()?.snapshot())
    }

    pub fn subscribe_telemetry(&self) -> TelemetrySubscription {
        self.feed.subscribe(HEALTH_DATA_KEY)
    }

    /// Form draft from the newest reading, if any has arrived.
    pub fn draft(&self) -> Option<AnalysisDraft> {
        self.feed
            .latest(HEALTH_DATA_KEY)
            .map(|reading| AnalysisDraft::from_reading(&reading))
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Analysis setup failed: {0}")]
    Analysis(#[from] AnalysisError),
}
