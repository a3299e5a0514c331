//! Trait definitions for external interactions
//!
//! These traits define the boundaries between engine logic and the host
//! environment. Infrastructure implementations live in other crates
//! (`tabpulse-store` for the record store; the embedder supplies the host).

use crate::error::{HostError, StoreError};
use crate::tab::{TabDescriptor, TabId, TabSnapshot};
use async_trait::async_trait;

/// The host's tab-lifecycle surface (the browser)
///
/// The engine only ever asks the host questions and requests closures; it
/// never owns tabs itself. Host events (created/updated/removed/activated)
/// flow the other way, delivered by the embedder to the sweep engine's event
/// entry points.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Enumerate all currently-open tabs, in host order
    async fn list_tabs(&self) -> Result<Vec<TabSnapshot>, HostError>;

    /// Fetch a single tab's current state, `None` if it no longer exists
    async fn get_tab(&self, id: TabId) -> Result<Option<TabSnapshot>, HostError>;

    /// Request closure of a tab
    ///
    /// Returns `HostError::NotFound` when the tab is already gone; callers
    /// treat that as success.
    async fn close_tab(&self, id: TabId) -> Result<(), HostError>;

    /// Reopen a saved tab, focused or in the background
    async fn reopen_tab(&self, tab: &TabDescriptor, focused: bool) -> Result<TabId, HostError>;
}

/// The persistent key-value store collaborator
///
/// Asynchronous, non-transactional, eventually durable. Records are plain
/// JSON values; callers own serialization. Read-then-write sequences are
/// NOT atomic. Callers that mutate shared records must serialize their own
/// updates (see the usage aggregator).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a named record, `None` if it has never been written
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write a named record, replacing any previous value
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}
