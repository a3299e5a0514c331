//! Error types for sweep operations

use tabpulse_domain::{HostError, StoreError};
use thiserror::Error;

/// Errors that can abort a whole sweep pass
///
/// Per-tab failures never surface here; they are logged and isolated so the
/// rest of the pass continues. A `SweepError` means the pass could not run
/// at all this tick; the worker logs it and the next tick retries.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The record store was unreachable when loading policy
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The host could not enumerate tabs
    #[error("host error: {0}")]
    Host(#[from] HostError),
}
