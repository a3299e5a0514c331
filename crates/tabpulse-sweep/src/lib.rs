//! TabPulse Sweep Engine
//!
//! Background housekeeping for long-lived tabs: periodic sweeps evaluate
//! every tracked tab against the configured eviction policy and request
//! closure of the stale ones.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Activity tracking**: per-tab last-activity timestamps, fed by host
//!   lifecycle events
//! - **Empty-tab tracking**: creation timestamps for placeholder/blank tabs,
//!   repaired by a reconciliation re-scan each sweep
//! - **Eviction**: an inactivity pass (TTL on last activity, with
//!   protected/focused/audible skip rules) and an empty-tab pass (TTL on
//!   creation, with a pre-close re-verification)
//! - **Metrics collection**: closures, reconciliation churn, retry backlog
//!
//! # Architecture
//!
//! One timer, one cadence: the [`SweepWorker`] owns the only recurring timer
//! in the system and fires reconciliation, the inactivity pass, and the
//! empty-tab pass in that order. Overlapping firings are dropped, never
//! queued. Eviction policy ([`tabpulse_domain::PolicyConfig`]) is re-read
//! from the record store on every cycle.
//!
//! # Usage
//!
//! ## One-time sweep
//!
//! ```no_run
//! use tabpulse_sweep::{Sweeper, SweepConfig};
//! use tabpulse_store::MemoryStore;
//! # use tabpulse_domain::{HostError, TabDescriptor, TabHost, TabId, TabSnapshot};
//! # struct MyHost;
//! # #[async_trait::async_trait]
//! # impl TabHost for MyHost {
//! #     async fn list_tabs(&self) -> Result<Vec<TabSnapshot>, HostError> { Ok(vec![]) }
//! #     async fn get_tab(&self, _: TabId) -> Result<Option<TabSnapshot>, HostError> { Ok(None) }
//! #     async fn close_tab(&self, _: TabId) -> Result<(), HostError> { Ok(()) }
//! #     async fn reopen_tab(&self, _: &TabDescriptor, _: bool) -> Result<TabId, HostError> { Ok(TabId::new(0)) }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sweeper = Sweeper::new(MyHost, MemoryStore::new(), SweepConfig::default());
//! sweeper.bootstrap(0).await?;
//! let report = sweeper.sweep(60_000).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Background worker
//!
//! See [`SweepWorker`] for the continuous mode: the embedder keeps a
//! [`SweepWorker::handle`] clone to feed `on_tab_*` events into the sweeper
//! between ticks.

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod sweeper;
mod worker;

pub use config::{ensure_policy_defaults, SweepConfig};
pub use error::SweepError;
pub use metrics::{CloseReason, SweepMetrics};
pub use sweeper::{EngineSnapshot, SweepReport, Sweeper};
pub use worker::SweepWorker;
