//! Metrics collection for sweep operations

use std::collections::HashMap;
use tabpulse_ledger::ReconcileOutcome;

/// Why a tab was closed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Exceeded the inactivity timeout
    Inactive,

    /// Sat empty past the empty-tab timeout
    Empty,
}

/// Cumulative metrics across sweep cycles
///
/// Tracks closures per reason, reconciliation churn, and close-request
/// failures left for retry.
#[derive(Debug, Clone, Default)]
pub struct SweepMetrics {
    /// Tabs closed, per reason
    pub closed: HashMap<CloseReason, usize>,

    /// Empty tabs discovered by reconciliation
    pub reconciled_in: usize,

    /// Transient entries dropped by reconciliation
    pub reconciled_out: usize,

    /// Close requests that failed and were left for the next sweep
    pub close_failures: usize,

    /// Sweep cycles completed
    pub sweep_count: usize,
}

impl SweepMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one closed tab
    pub fn record_closure(&mut self, reason: CloseReason) {
        *self.closed.entry(reason).or_insert(0) += 1;
    }

    /// Record a reconciliation pass outcome
    pub fn record_reconcile(&mut self, outcome: ReconcileOutcome) {
        self.reconciled_in += outcome.inserted;
        self.reconciled_out += outcome.removed;
    }

    /// Record a failed close request (entry retained for retry)
    pub fn record_close_failure(&mut self) {
        self.close_failures += 1;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Total tabs closed across all reasons
    pub fn total_closed(&self) -> usize {
        self.closed.values().sum()
    }

    /// Tabs closed for a specific reason
    pub fn closed_for(&self, reason: CloseReason) -> usize {
        self.closed.get(&reason).copied().unwrap_or(0)
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        self.closed.clear();
        self.reconciled_in = 0;
        self.reconciled_out = 0;
        self.close_failures = 0;
        self.sweep_count = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Sweep Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!(
                "Closed: {} ({} inactive, {} empty)",
                self.total_closed(),
                self.closed_for(CloseReason::Inactive),
                self.closed_for(CloseReason::Empty)
            ),
            format!(
                "Reconciled: {} tracked, {} dropped",
                self.reconciled_in, self.reconciled_out
            ),
        ];

        if self.close_failures > 0 {
            lines.push(format!("Close failures pending retry: {}", self.close_failures));
        }

        lines.join("\n")
    }
}
