//! TabPulse Ledgers
//!
//! In-memory, per-tab timestamp state that drives eviction decisions:
//!
//! - [`ActivityLedger`]: tab id → last-activity timestamp, fed by activity
//!   events, monotonic per tab
//! - [`TransientLedger`]: tab id → creation timestamp, for tabs classified
//!   "empty" (placeholder/blank), with a reconciliation re-scan to repair
//!   event-delivery gaps
//!
//! Both ledgers are volatile: they are exclusively owned by the engine,
//! rebuilt from the live tab set on (re)start, and never persisted. All
//! mutations are synchronous single steps. No operation suspends between
//! reading and writing the map, so a handler's mutation is atomically
//! applied even when the surrounding handler is async.
//!
//! The raw maps are never exposed; invariants (forward-only timestamps,
//! single-writer mutation) are enforced at this boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod activity;
mod transient;

pub use activity::ActivityLedger;
pub use transient::{ReconcileOutcome, TransientLedger};
