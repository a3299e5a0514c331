//! Activity ledger - last-activity timestamps per open tab

use std::collections::HashMap;
use tabpulse_domain::TabId;

/// Mapping of tab id → last-activity timestamp (epoch ms)
///
/// One record per currently-open tab. Timestamps only move forward: an
/// update carrying an older timestamp than the stored one is ignored, which
/// defends against out-of-order event delivery from the host.
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    last_active: HashMap<TabId, u64>,
}

impl ActivityLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-update a tab's last-activity timestamp, monotonically
    ///
    /// Returns `true` when the stored value changed.
    pub fn touch(&mut self, id: TabId, timestamp_ms: u64) -> bool {
        match self.last_active.get(&id) {
            Some(&stored) if stored >= timestamp_ms => false,
            _ => {
                self.last_active.insert(id, timestamp_ms);
                true
            }
        }
    }

    /// Forget a tab; later lookups return `None`
    pub fn remove(&mut self, id: TabId) {
        self.last_active.remove(&id);
    }

    /// Whether the tab is currently tracked
    pub fn contains(&self, id: TabId) -> bool {
        self.last_active.contains_key(&id)
    }

    /// Stored last-activity timestamp, if tracked
    pub fn last_active(&self, id: TabId) -> Option<u64> {
        self.last_active.get(&id).copied()
    }

    /// Milliseconds since the tab's last activity
    ///
    /// `None` means the tab is unknown. Policy treats that as "just
    /// discovered: start tracking now, do not evict this round."
    pub fn last_activity_age(&self, id: TabId, now_ms: u64) -> Option<u64> {
        self.last_active
            .get(&id)
            .map(|&ts| now_ms.saturating_sub(ts))
    }

    /// Number of tracked tabs
    pub fn len(&self) -> usize {
        self.last_active.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.last_active.is_empty()
    }

    /// Age of the stalest tracked tab, for display surfaces
    pub fn oldest_age(&self, now_ms: u64) -> Option<u64> {
        self.last_active
            .values()
            .map(|&ts| now_ms.saturating_sub(ts))
            .max()
    }

    /// Tracked tab ids (arbitrary order)
    pub fn ids(&self) -> impl Iterator<Item = TabId> + '_ {
        self.last_active.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_inserts() {
        let mut ledger = ActivityLedger::new();
        assert!(ledger.touch(TabId::new(1), 100));
        assert_eq!(ledger.last_active(TabId::new(1)), Some(100));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut ledger = ActivityLedger::new();
        ledger.touch(TabId::new(1), 100);

        // Older timestamp ignored
        assert!(!ledger.touch(TabId::new(1), 50));
        assert_eq!(ledger.last_active(TabId::new(1)), Some(100));

        // Equal timestamp ignored too
        assert!(!ledger.touch(TabId::new(1), 100));

        // Newer timestamp applied
        assert!(ledger.touch(TabId::new(1), 200));
        assert_eq!(ledger.last_active(TabId::new(1)), Some(200));
    }

    #[test]
    fn test_remove_forgets_tab() {
        let mut ledger = ActivityLedger::new();
        ledger.touch(TabId::new(1), 100);
        ledger.remove(TabId::new(1));

        assert!(!ledger.contains(TabId::new(1)));
        assert_eq!(ledger.last_activity_age(TabId::new(1), 500), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_age_computation() {
        let mut ledger = ActivityLedger::new();
        ledger.touch(TabId::new(1), 1_000);

        assert_eq!(ledger.last_activity_age(TabId::new(1), 4_000), Some(3_000));
        // Clock skew: age saturates at zero instead of underflowing
        assert_eq!(ledger.last_activity_age(TabId::new(1), 500), Some(0));
        // Unknown tab
        assert_eq!(ledger.last_activity_age(TabId::new(9), 4_000), None);
    }

    #[test]
    fn test_oldest_age() {
        let mut ledger = ActivityLedger::new();
        assert_eq!(ledger.oldest_age(1_000), None);

        ledger.touch(TabId::new(1), 900);
        ledger.touch(TabId::new(2), 400);
        assert_eq!(ledger.oldest_age(1_000), Some(600));
    }
}
