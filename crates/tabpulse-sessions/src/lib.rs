//! TabPulse Session Snapshots
//!
//! Captures and restores named sets of tabs. Sessions are independent of the
//! eviction machinery and only ever change on explicit user action.
//!
//! Every session carries a stable UUIDv7 id assigned at capture; delete and
//! restore address sessions by id. The persisted list can be mutated between
//! any read and the action taken on it, so positional identity would silently
//! act on the wrong session.

#![warn(missing_docs)]

use tabpulse_domain::{
    keys, HostError, RecordStore, Session, SessionId, StoreError, TabDescriptor, TabHost, TabId,
    TabSnapshot,
};
use thiserror::Error;

/// Errors from session operations
///
/// These are the engine's only user-visible failures; everything background
/// is logged and retried instead.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Every candidate tab was filtered out, nothing to save
    #[error("no tabs to capture after filtering")]
    EmptyCapture,

    /// No session with the given id
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The record store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The host failed while restoring
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

/// Session snapshot store
///
/// Persists an ordered list of [`Session`] records under the sessions key.
/// Nothing is cached between calls; each operation reads the list fresh.
pub struct SessionStore<H, S> {
    host: H,
    store: S,
    protected_prefixes: Vec<String>,
}

impl<H: TabHost, S: RecordStore> SessionStore<H, S> {
    /// Create a session store
    ///
    /// `protected_prefixes` mirrors the sweep engine's protected URL list:
    /// internal pages are never captured into a session.
    pub fn new(host: H, store: S, protected_prefixes: Vec<String>) -> Self {
        Self {
            host,
            store,
            protected_prefixes,
        }
    }

    /// Capture a named session from the given tabs
    ///
    /// Protected and URL-less tabs are filtered out first; when nothing
    /// survives the filter the save fails with
    /// [`SessionError::EmptyCapture`] and the persisted list is untouched.
    /// Returns the saved session (with its fresh id).
    pub async fn save(
        &self,
        name: &str,
        tabs: &[TabSnapshot],
        now_ms: u64,
    ) -> Result<Session, SessionError> {
        let captured: Vec<TabDescriptor> = tabs
            .iter()
            .filter(|tab| !tab.is_protected(&self.protected_prefixes))
            .filter_map(|tab| {
                tab.url.as_ref().map(|url| TabDescriptor {
                    url: url.clone(),
                    title: tab.title.clone(),
                })
            })
            .collect();

        if captured.is_empty() {
            return Err(SessionError::EmptyCapture);
        }

        let session = Session::new(name, now_ms, captured);

        let mut sessions = self.list().await?;
        sessions.push(session.clone());
        self.persist(&sessions).await?;

        tracing::info!(session = %session.id, tabs = session.tabs.len(), "Session saved");
        Ok(session)
    }

    /// Reopen every tab of a session: first focused, the rest background
    ///
    /// A tab that fails to reopen is logged and skipped so one bad URL does
    /// not abort the rest of the restore. Returns the ids of the tabs that
    /// were opened.
    pub async fn restore(&self, id: SessionId) -> Result<Vec<TabId>, SessionError> {
        let sessions = self.list().await?;
        let session = sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or(SessionError::NotFound(id))?;

        let mut opened = Vec::new();
        for (index, tab) in session.tabs.iter().enumerate() {
            match self.host.reopen_tab(tab, index == 0).await {
                Ok(tab_id) => opened.push(tab_id),
                Err(e) => {
                    tracing::warn!(url = %tab.url, "Could not reopen tab: {}", e);
                }
            }
        }

        tracing::info!(session = %id, opened = opened.len(), "Session restored");
        Ok(opened)
    }

    /// Delete a session by its stable id
    pub async fn delete(&self, id: SessionId) -> Result<(), SessionError> {
        let mut sessions = self.list().await?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);

        if sessions.len() == before {
            return Err(SessionError::NotFound(id));
        }

        self.persist(&sessions).await?;
        tracing::info!(session = %id, "Session deleted");
        Ok(())
    }

    /// All saved sessions, in capture order
    ///
    /// A malformed persisted list is treated as empty rather than an error.
    pub async fn list(&self) -> Result<Vec<Session>, SessionError> {
        Ok(match self.store.get(keys::SESSIONS).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::warn!("Stored sessions unreadable, treating as empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        })
    }

    async fn persist(&self, sessions: &[Session]) -> Result<(), SessionError> {
        let value =
            serde_json::to_value(sessions).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.store.set(keys::SESSIONS, value).await?;
        Ok(())
    }
}
