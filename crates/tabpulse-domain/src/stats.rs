//! Per-day usage counters
//!
//! Persisted as a map of day key to [`DailyStats`] under
//! [`crate::keys::DAILY_STATS`]. Records are created lazily on the first
//! event of a new day and never deleted automatically.

use serde::{Deserialize, Serialize};

/// Open/close counters for one calendar day
///
/// Counts only move forward within a day; there is exactly one record per
/// day key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Calendar day key, `YYYY-MM-DD` (UTC)
    pub date: String,

    /// Tabs opened on this day
    #[serde(default)]
    pub opened: u64,

    /// Tabs closed on this day
    #[serde(default)]
    pub closed: u64,
}

impl DailyStats {
    /// Fresh zeroed record for a day
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            opened: 0,
            closed: 0,
        }
    }

    /// Total events recorded on this day
    pub fn total(&self) -> u64 {
        self.opened + self.closed
    }
}
