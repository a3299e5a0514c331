//! Error taxonomy shared by all layers

use thiserror::Error;

/// Errors from the host's tab-lifecycle surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The tab no longer exists
    ///
    /// An expected race during sweeps: treat as already gone and clean up,
    /// never as a failure.
    #[error("tab not found")]
    NotFound,

    /// The host refused the operation
    #[error("operation denied by host: {0}")]
    Denied(String),

    /// The operation failed for another reason
    #[error("host operation failed: {0}")]
    Failed(String),
}

/// Errors from the persistent record store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store is temporarily unreachable
    ///
    /// Transient: callers retry on the next natural trigger instead of
    /// crashing the engine.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded
    ///
    /// Callers fall back to documented defaults rather than failing the
    /// whole engine.
    #[error("malformed persisted record: {0}")]
    Malformed(String),
}
