//! Transient-tab ledger - creation timestamps for empty tabs

use std::collections::{HashMap, HashSet};
use tabpulse_domain::{TabId, TabSnapshot};

/// Counts of ledger changes made by one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Empty tabs discovered and newly tracked
    pub inserted: usize,

    /// Entries dropped (tab navigated to content or no longer exists)
    pub removed: usize,
}

impl ReconcileOutcome {
    /// Whether the pass changed the ledger at all
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.removed > 0
    }
}

/// Mapping of tab id → creation timestamp, for tabs classified "empty"
///
/// An entry exists only while the tab has no navigable content (new-tab
/// placeholder, blank sentinel, or no URL). Event delivery gaps can make the
/// ledger drift from reality: a tab created before the engine was listening
/// is invisible to it. [`TransientLedger::reconcile`] re-scans the full
/// tab set and repairs the ledger in both directions.
#[derive(Debug, Clone, Default)]
pub struct TransientLedger {
    created_at: HashMap<TabId, u64>,
}

impl TransientLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a tab as empty, keeping the original timestamp when the tab is
    /// already tracked
    ///
    /// Returns `true` when a new entry was created.
    pub fn mark_empty(&mut self, id: TabId, now_ms: u64) -> bool {
        if self.created_at.contains_key(&id) {
            return false;
        }
        self.created_at.insert(id, now_ms);
        true
    }

    /// Stop tracking a tab (navigated to real content, removed, or evicted)
    pub fn mark_not_empty(&mut self, id: TabId) {
        self.created_at.remove(&id);
    }

    /// Stored creation timestamp, if tracked
    pub fn created_at(&self, id: TabId) -> Option<u64> {
        self.created_at.get(&id).copied()
    }

    /// Whether the tab is currently tracked as empty
    pub fn contains(&self, id: TabId) -> bool {
        self.created_at.contains_key(&id)
    }

    /// Number of tracked empty tabs
    pub fn len(&self) -> usize {
        self.created_at.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.created_at.is_empty()
    }

    /// Age of the longest-tracked empty tab, for display surfaces
    pub fn oldest_age(&self, now_ms: u64) -> Option<u64> {
        self.created_at
            .values()
            .map(|&ts| now_ms.saturating_sub(ts))
            .max()
    }

    /// Tracked entries as (id, created_at) pairs (arbitrary order)
    pub fn entries(&self) -> Vec<(TabId, u64)> {
        self.created_at.iter().map(|(&id, &ts)| (id, ts)).collect()
    }

    /// Full re-scan against the live tab set
    ///
    /// Inserts missing empty tabs (stamped `now_ms`) and removes entries for
    /// tabs that are no longer empty or no longer exist. Idempotent: running
    /// it twice with no intervening state change leaves the ledger unchanged
    /// on the second run.
    pub fn reconcile(&mut self, tabs: &[TabSnapshot], now_ms: u64) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        let mut empty_ids: HashSet<TabId> = HashSet::new();
        for tab in tabs {
            if tab.is_empty() {
                empty_ids.insert(tab.id);
                if self.mark_empty(tab.id, now_ms) {
                    outcome.inserted += 1;
                }
            }
        }

        let stale: Vec<TabId> = self
            .created_at
            .keys()
            .copied()
            .filter(|id| !empty_ids.contains(id))
            .collect();
        for id in stale {
            self.created_at.remove(&id);
            outcome.removed += 1;
        }

        outcome
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_tabs() -> impl Strategy<Value = Vec<TabSnapshot>> {
        // Map keyed by id so every id appears at most once
        proptest::collection::hash_map(0u64..40, proptest::bool::ANY, 0..30).prop_map(|specs| {
            specs
                .into_iter()
                .map(|(id, empty)| TabSnapshot {
                    id: TabId::new(id),
                    url: if empty {
                        Some("about:blank".to_string())
                    } else {
                        Some(format!("https://site-{}.example", id))
                    },
                    title: None,
                    active: false,
                    audible: false,
                })
                .collect()
        })
    }

    proptest! {
        /// Property: a second reconcile against the same tab set makes no
        /// changes, regardless of prior ledger contents.
        #[test]
        fn test_reconcile_idempotent(tabs in arb_tabs(), seeds in proptest::collection::vec(0u64..40, 0..10)) {
            let mut ledger = TransientLedger::new();
            for id in seeds {
                ledger.mark_empty(TabId::new(id), 1);
            }

            ledger.reconcile(&tabs, 100);
            let second = ledger.reconcile(&tabs, 200);
            prop_assert!(!second.changed());
        }

        /// Property: after reconcile, the ledger tracks exactly the empty
        /// tabs in the scanned set.
        #[test]
        fn test_reconcile_matches_reality(tabs in arb_tabs()) {
            let mut ledger = TransientLedger::new();
            ledger.reconcile(&tabs, 100);

            for tab in &tabs {
                prop_assert_eq!(ledger.contains(tab.id), tab.is_empty());
            }
        }
    }
}
