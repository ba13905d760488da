//! Request-generation tracking for glucose analyses.
//!
//! Responses from the reasoning service can arrive out of order. Every
//! analysis takes a ticket from `AnalysisCoordinator::begin()`, which
//! bumps the generation counter and cancels whatever ticket was issued
//! before it. A completed analysis is only surfaced if its ticket is still
//! the latest; anything older is discarded as stale.
//!
//! - `begin()` issues a ticket (generation + cancellation token)
//! - `is_current()` decides whether a finished result may be delivered
//! - `current_operation()` provides observability (which request, since when)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Snapshot of the analysis currently in flight.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveAnalysis {
    pub request_id: Uuid,
    pub generation: u64,
    /// When the analysis started (ISO 8601).
    pub started_at: String,
}

struct InFlight {
    info: ActiveAnalysis,
    token: CancellationToken,
}

// ═══════════════════════════════════════════════════════════
// AnalysisCoordinator
// ═══════════════════════════════════════════════════════════

/// Issues analysis tickets and tracks which one is the latest.
pub struct AnalysisCoordinator {
    latest: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
}

impl AnalysisCoordinator {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Start a new analysis, superseding (and cancelling) any earlier one.
    ///
    /// The returned ticket must be held for the whole analysis; dropping
    /// it clears the in-flight state if it is still the latest.
    pub fn begin(&self) -> AnalysisTicket<'_> {
        let token = CancellationToken::new();

        let mut slot = match self.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = slot.take() {
            tracing::debug!(
                superseded = previous.info.generation,
                by = generation,
                "Cancelling superseded analysis"
            );
            previous.token.cancel();
        }

        let info = ActiveAnalysis {
            request_id: Uuid::new_v4(),
            generation,
            started_at: chrono::Utc::now().to_rfc3339(),
        };
        let request_id = info.request_id;
        *slot = Some(InFlight {
            info,
            token: token.clone(),
        });

        AnalysisTicket {
            request_id,
            generation,
            token,
            coordinator: self,
        }
    }

    /// Latest generation issued so far (0 before the first request).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Whether a result for `generation` may still be delivered.
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest_generation() == generation
    }

    /// What analysis is currently running? `None` when idle.
    pub fn current_operation(&self) -> Option<ActiveAnalysis> {
        self.in_flight
            .lock()
            .ok()?
            .as_ref()
            .map(|in_flight| in_flight.info.clone())
    }

    fn release(&self, generation: u64) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if slot
                .as_ref()
                .is_some_and(|in_flight| in_flight.info.generation == generation)
            {
                *slot = None;
            }
        }
    }
}

impl Default for AnalysisCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// AnalysisTicket: RAII handle for one analysis
// ═══════════════════════════════════════════════════════════

/// Handle for one in-flight analysis.
pub struct AnalysisTicket<'a> {
    pub request_id: Uuid,
    pub generation: u64,
    token: CancellationToken,
    coordinator: &'a AnalysisCoordinator,
}

impl AnalysisTicket<'_> {
    /// Token that fires when a newer analysis supersedes this one.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether this ticket is still the latest issued.
    pub fn is_current(&self) -> bool {
        self.coordinator.is_current(self.generation)
    }
}

impl Drop for AnalysisTicket<'_> {
    fn drop(&mut self) {
        self.coordinator.release(self.generation);
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_coordinator_is_idle() {
        let coordinator = AnalysisCoordinator::new();
        assert_eq!(coordinator.latest_generation(), 0);
        assert!(coordinator.current_operation().is_none());
    }

    #[test]
    fn begin_sets_current_operation() {
        let coordinator = AnalysisCoordinator::new();
        let ticket = coordinator.begin();
        assert_eq!(ticket.generation, 1);
        assert!(ticket.is_current());

        let op = coordinator.current_operation().unwrap();
        assert_eq!(op.generation, 1);
        assert_eq!(op.request_id, ticket.request_id);
        assert!(!op.started_at.is_empty());

        drop(ticket);
        assert!(coordinator.current_operation().is_none());
    }

    #[test]
    fn newer_ticket_supersedes_and_cancels_older() {
        let coordinator = AnalysisCoordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(first.cancellation().is_cancelled());
        assert!(!first.is_current());
        assert!(!second.cancellation().is_cancelled());
        assert!(second.is_current());
    }

    #[test]
    fn dropping_stale_ticket_keeps_newer_in_flight() {
        let coordinator = AnalysisCoordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();

        drop(first);
        assert_eq!(coordinator.current_operation().unwrap().generation, second.generation);
    }

    #[test]
    fn active_analysis_serializes() {
        let op = ActiveAnalysis {
            request_id: Uuid::nil(),
            generation: 3,
            started_at: "2026-02-22T10:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"generation\":3"));
        assert!(json.contains("2026-02-22T10:00:00Z"));
    }
}
