//! Background worker that drives the sweep on a schedule

use crate::{SweepConfig, Sweeper};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tabpulse_domain::{RecordStore, TabHost};
use tokio::sync::Mutex;
use tokio::time::interval;

/// Current timestamp in milliseconds since Unix epoch
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Scheduler for continuous sweep operation
///
/// Owns the single recurring timer: one cadence, configured once at startup,
/// drives reconciliation and both eviction passes. The sweeper sits behind a
/// shared mutex so the embedder can feed host events into it between ticks
/// (clone [`SweepWorker::handle`]).
///
/// A tick that fires while a previous sweep is still in flight is dropped,
/// not queued. The next tick covers the same ground, so queuing would only
/// create back-to-back duplicate passes.
///
/// # Examples
///
/// ```no_run
/// use tabpulse_sweep::{SweepConfig, Sweeper, SweepWorker};
/// use tabpulse_store::MemoryStore;
/// # use tabpulse_domain::{HostError, TabDescriptor, TabHost, TabId, TabSnapshot};
/// # struct MyHost;
/// # #[async_trait::async_trait]
/// # impl TabHost for MyHost {
/// #     async fn list_tabs(&self) -> Result<Vec<TabSnapshot>, HostError> { Ok(vec![]) }
/// #     async fn get_tab(&self, _: TabId) -> Result<Option<TabSnapshot>, HostError> { Ok(None) }
/// #     async fn close_tab(&self, _: TabId) -> Result<(), HostError> { Ok(()) }
/// #     async fn reopen_tab(&self, _: &TabDescriptor, _: bool) -> Result<TabId, HostError> { Ok(TabId::new(0)) }
/// # }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sweeper = Sweeper::new(MyHost, MemoryStore::new(), SweepConfig::default());
///     let mut worker = SweepWorker::new(sweeper);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run().await;
///     Ok(())
/// }
/// ```
pub struct SweepWorker<H, S> {
    sweeper: Arc<Mutex<Sweeper<H, S>>>,
    interval: std::time::Duration,
    dropped_ticks: u64,
}

impl<H: TabHost, S: RecordStore> SweepWorker<H, S> {
    /// Create a worker around a sweeper, taking the cadence from its config
    pub fn new(sweeper: Sweeper<H, S>) -> Self {
        let interval = sweeper.config().sweep_interval();
        Self {
            sweeper: Arc::new(Mutex::new(sweeper)),
            interval,
            dropped_ticks: 0,
        }
    }

    /// Shared handle to the sweeper, for feeding host events
    pub fn handle(&self) -> Arc<Mutex<Sweeper<H, S>>> {
        Arc::clone(&self.sweeper)
    }

    /// Ticks dropped because a sweep was still in flight
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Run the worker indefinitely
    ///
    /// Fires the sweep at the configured interval until a shutdown signal
    /// (Ctrl+C) is received. Sweep failures are logged and the next tick
    /// retries; they never stop the worker.
    pub async fn run(&mut self) {
        let mut ticker = interval(self.interval);

        tracing::info!("Sweep worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.fire().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sweep worker");
                    break;
                }
            }
        }

        let sweeper = self.sweeper.lock().await;
        tracing::info!("Sweep worker stopped. Final metrics:\n{}", sweeper.metrics().summary());
    }

    /// Run for a specific number of ticks (useful for testing)
    ///
    /// Dropped ticks count toward the total: a tick that arrives during an
    /// in-flight sweep is spent, not deferred.
    pub async fn run_cycles(&mut self, cycles: usize) {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Sweep worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for _ in 0..cycles {
            ticker.tick().await;
            self.fire().await;
        }
    }

    /// One tick: sweep unless a previous firing is still in flight
    async fn fire(&mut self) {
        let Ok(mut sweeper) = self.sweeper.try_lock() else {
            self.dropped_ticks += 1;
            tracing::debug!("Previous sweep still in flight, dropping tick");
            return;
        };

        let now_ms = current_timestamp_ms();
        match sweeper.sweep(now_ms).await {
            Ok(report) => {
                tracing::info!(
                    "Sweep completed: {} inactive closed, {} empty closed, {} newly tracked",
                    report.closed_inactive,
                    report.closed_empty,
                    report.reconcile.inserted
                );
            }
            Err(e) => {
                tracing::error!("Sweep failed: {}", e);
            }
        }
    }
}
