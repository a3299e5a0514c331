//! TabPulse Domain Layer
//!
//! Core types and trait seams for the tab housekeeping engine. This crate
//! defines the shapes every other layer agrees on:
//!
//! - **Tab types**: host-assigned ids, point-in-time tab snapshots, the
//!   descriptor shape persisted inside sessions
//! - **Persisted records**: eviction policy, per-day usage counters, saved
//!   sessions (all JSON-serializable, owned by the external record store)
//! - **Trait seams**: `TabHost` (the browser) and `RecordStore` (the
//!   persistent key-value store); infrastructure implementations live in
//!   other crates
//! - **Error taxonomy**: host and store failures every layer maps onto
//!
//! The engine's in-memory ledgers live in `tabpulse-ledger`; this crate holds
//! only what crosses a boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod keys;
pub mod policy;
pub mod session;
pub mod stats;
pub mod tab;
pub mod traits;

// Re-exports for convenience
pub use error::{HostError, StoreError};
pub use policy::PolicyConfig;
pub use session::{Session, SessionId};
pub use stats::DailyStats;
pub use tab::{is_empty_url, TabChange, TabDescriptor, TabId, TabSnapshot};
pub use traits::{RecordStore, TabHost};
