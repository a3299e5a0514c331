//! Session snapshots - saved, named sets of tab descriptors

use crate::tab::TabDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a saved session, based on UUIDv7
///
/// Sessions are addressed by id, never by list position: the persisted list
/// can be concurrently mutated between a read and the action taken on it, so
/// positional identity is unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Generate a new UUIDv7-based SessionId
    ///
    /// # Examples
    ///
    /// ```
    /// use tabpulse_domain::SessionId;
    ///
    /// let a = SessionId::new();
    /// let b = SessionId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a SessionId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid session id: {}", e))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved set of tabs, immutable once captured except via explicit delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier assigned at creation
    pub id: SessionId,

    /// User-chosen name
    pub name: String,

    /// Capture time (epoch ms)
    pub created_at_ms: u64,

    /// Captured tabs, in capture order
    pub tabs: Vec<TabDescriptor>,
}

impl Session {
    /// Create a session with a fresh id
    pub fn new(name: impl Into<String>, created_at_ms: u64, tabs: Vec<TabDescriptor>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            created_at_ms,
            tabs,
        }
    }
}
