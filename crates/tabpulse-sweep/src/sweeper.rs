//! Core eviction engine: ledgers, event intake, and the sweep passes

use crate::{CloseReason, SweepConfig, SweepError, SweepMetrics};
use tabpulse_domain::{
    keys, HostError, PolicyConfig, RecordStore, StoreError, TabChange, TabHost, TabId, TabSnapshot,
};
use tabpulse_ledger::{ActivityLedger, ReconcileOutcome, TransientLedger};

/// What one sweep cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Transient-ledger churn from the reconciliation step
    pub reconcile: ReconcileOutcome,

    /// Tabs closed by the inactivity pass
    pub closed_inactive: usize,

    /// Tabs closed by the empty-tab pass
    pub closed_empty: usize,
}

/// Read-only view of ledger state, for display surfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Tabs with an activity record
    pub tracked_tabs: usize,

    /// Tabs tracked as empty
    pub transient_tabs: usize,

    /// Age of the stalest activity record (ms)
    pub oldest_activity_age_ms: Option<u64>,

    /// Age of the longest-lived empty tab (ms)
    pub oldest_transient_age_ms: Option<u64>,
}

/// The eviction policy engine
///
/// Owns both in-memory ledgers plus handles to the host and the record
/// store. Host lifecycle events flow in through the `on_tab_*` entry points
/// (synchronous ledger mutations); the scheduler drives [`Sweeper::sweep`]
/// at a fixed cadence.
///
/// Ledgers are volatile: call [`Sweeper::bootstrap`] after construction to
/// rebuild them from the live tab set.
///
/// # Examples
///
/// ```no_run
/// use tabpulse_sweep::{Sweeper, SweepConfig};
/// use tabpulse_store::MemoryStore;
/// # use tabpulse_domain::{HostError, TabDescriptor, TabHost, TabId, TabSnapshot};
/// # struct MyHost;
/// # #[async_trait::async_trait]
/// # impl TabHost for MyHost {
/// #     async fn list_tabs(&self) -> Result<Vec<TabSnapshot>, HostError> { Ok(vec![]) }
/// #     async fn get_tab(&self, _: TabId) -> Result<Option<TabSnapshot>, HostError> { Ok(None) }
/// #     async fn close_tab(&self, _: TabId) -> Result<(), HostError> { Ok(()) }
/// #     async fn reopen_tab(&self, _: &TabDescriptor, _: bool) -> Result<TabId, HostError> { Ok(TabId::new(0)) }
/// # }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sweeper = Sweeper::new(MyHost, MemoryStore::new(), SweepConfig::default());
/// sweeper.bootstrap(now_ms()).await?;
/// let report = sweeper.sweep(now_ms()).await?;
/// println!("closed {} inactive tabs", report.closed_inactive);
/// # Ok(())
/// # }
/// # fn now_ms() -> u64 { 0 }
/// ```
pub struct Sweeper<H, S> {
    host: H,
    store: S,
    config: SweepConfig,
    activity: ActivityLedger,
    transient: TransientLedger,
    metrics: SweepMetrics,
}

impl<H: TabHost, S: RecordStore> Sweeper<H, S> {
    /// Create a sweeper with empty ledgers
    pub fn new(host: H, store: S, config: SweepConfig) -> Self {
        Self {
            host,
            store,
            config,
            activity: ActivityLedger::new(),
            transient: TransientLedger::new(),
            metrics: SweepMetrics::new(),
        }
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Engine configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Read-only ledger sizes and ages for the UI collaborator
    pub fn snapshot(&self, now_ms: u64) -> EngineSnapshot {
        EngineSnapshot {
            tracked_tabs: self.activity.len(),
            transient_tabs: self.transient.len(),
            oldest_activity_age_ms: self.activity.oldest_age(now_ms),
            oldest_transient_age_ms: self.transient.oldest_age(now_ms),
        }
    }

    /// Rebuild both ledgers from the live tab set
    ///
    /// Run once on engine (re)start: the ledgers are never persisted, so any
    /// tab open before the engine was listening would otherwise be invisible
    /// until its first event.
    pub async fn bootstrap(&mut self, now_ms: u64) -> Result<(), SweepError> {
        let tabs = self.host.list_tabs().await?;

        for tab in &tabs {
            self.activity.touch(tab.id, now_ms);
        }
        let outcome = self.transient.reconcile(&tabs, now_ms);

        tracing::info!(
            tabs = tabs.len(),
            empty = outcome.inserted,
            "Ledgers rebuilt from live tab set"
        );
        Ok(())
    }

    /// Host event: a tab was created
    pub fn on_tab_created(&mut self, tab: &TabSnapshot, now_ms: u64) {
        self.activity.touch(tab.id, now_ms);
        if tab.is_empty() {
            self.transient.mark_empty(tab.id, now_ms);
        }
    }

    /// Host event: a tab changed (navigation, load progress)
    pub fn on_tab_updated(&mut self, id: TabId, change: &TabChange, now_ms: u64) {
        if change.load_complete || change.url.is_some() {
            self.activity.touch(id, now_ms);
        }

        if let Some(url) = &change.url {
            if tabpulse_domain::is_empty_url(Some(url)) {
                self.transient.mark_empty(id, now_ms);
            } else {
                self.transient.mark_not_empty(id);
            }
        }
    }

    /// Host event: a tab was removed
    pub fn on_tab_removed(&mut self, id: TabId) {
        self.activity.remove(id);
        self.transient.mark_not_empty(id);
    }

    /// Host event: a tab gained focus
    pub fn on_tab_activated(&mut self, id: TabId, now_ms: u64) {
        self.activity.touch(id, now_ms);
    }

    /// Run one full sweep cycle
    ///
    /// In order: transient-ledger reconciliation, the inactivity pass, the
    /// empty-tab pass. Policy is re-read from the store every cycle so
    /// settings changes take effect on the next tick. Per-tab failures are
    /// logged and isolated; only an unreachable store or host aborts the
    /// cycle (and the next tick retries).
    pub async fn sweep(&mut self, now_ms: u64) -> Result<SweepReport, SweepError> {
        let policy = self.load_policy().await?;
        let tabs = self.host.list_tabs().await?;

        let mut report = SweepReport {
            reconcile: self.transient.reconcile(&tabs, now_ms),
            ..Default::default()
        };
        self.metrics.record_reconcile(report.reconcile);

        report.closed_inactive = self.inactivity_pass(&policy, &tabs, now_ms).await;
        report.closed_empty = self.empty_pass(&policy, now_ms).await;

        self.metrics.record_sweep();
        Ok(report)
    }

    async fn load_policy(&self) -> Result<PolicyConfig, SweepError> {
        match self.store.get(keys::POLICY_CONFIG).await {
            Ok(Some(value)) => Ok(PolicyConfig::from_stored(value)),
            Ok(None) => Ok(PolicyConfig::default()),
            Err(StoreError::Malformed(e)) => {
                tracing::warn!("Stored policy unreadable, using defaults: {}", e);
                Ok(PolicyConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close tabs whose last activity is older than the configured timeout
    ///
    /// Tabs are evaluated in host-enumeration order. Skip rules, in order:
    /// protected URL prefix, currently focused, currently audible. A tab
    /// with no activity record gets one stamped `now` and is skipped this
    /// round (cold-start grace).
    async fn inactivity_pass(
        &mut self,
        policy: &PolicyConfig,
        tabs: &[TabSnapshot],
        now_ms: u64,
    ) -> usize {
        if !policy.inactivity_eviction_enabled {
            return 0;
        }

        let timeout_ms = policy.inactivity_timeout_ms();
        let mut closed = 0;

        for tab in tabs {
            if tab.is_protected(&self.config.protected_prefixes) {
                continue;
            }
            if tab.active {
                continue;
            }
            if tab.audible {
                continue;
            }

            let age = match self.activity.last_activity_age(tab.id, now_ms) {
                Some(age) => age,
                None => {
                    // First sighting: start tracking, evaluate next sweep
                    self.activity.touch(tab.id, now_ms);
                    continue;
                }
            };

            if age <= timeout_ms {
                continue;
            }

            match self.host.close_tab(tab.id).await {
                Ok(()) => {
                    tracing::info!(
                        tab = %tab.id,
                        inactive_mins = age / 60_000,
                        "Closed inactive tab"
                    );
                    self.activity.remove(tab.id);
                    self.metrics.record_closure(CloseReason::Inactive);
                    closed += 1;
                }
                Err(HostError::NotFound) => {
                    // Already gone; stop tracking it
                    tracing::debug!(tab = %tab.id, "Tab vanished before close");
                    self.activity.remove(tab.id);
                }
                Err(e) => {
                    // Entry retained so the next sweep retries
                    tracing::warn!(tab = %tab.id, "Close request failed: {}", e);
                    self.metrics.record_close_failure();
                }
            }
        }

        closed
    }

    /// Close tabs that have sat empty past the empty-tab timeout
    ///
    /// Before closing, each candidate is re-fetched and re-classified: a
    /// navigation may have landed between reconciliation and this check.
    async fn empty_pass(&mut self, policy: &PolicyConfig, now_ms: u64) -> usize {
        if !policy.empty_eviction_enabled {
            return 0;
        }

        let mut closed = 0;

        for (id, created_at) in self.transient.entries() {
            let idle = now_ms.saturating_sub(created_at);
            if idle <= policy.empty_timeout_ms {
                continue;
            }

            let snapshot = match self.host.get_tab(id).await {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) | Err(HostError::NotFound) => {
                    // Already gone: not an error, just clean up
                    self.transient.mark_not_empty(id);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(tab = %id, "Could not re-verify empty tab: {}", e);
                    continue;
                }
            };

            if !snapshot.is_empty() {
                // Navigated since reconciliation; no longer a candidate
                self.transient.mark_not_empty(id);
                continue;
            }

            match self.host.close_tab(id).await {
                Ok(()) => {
                    tracing::info!(tab = %id, idle_mins = idle / 60_000, "Closed empty tab");
                    self.transient.mark_not_empty(id);
                    self.activity.remove(id);
                    self.metrics.record_closure(CloseReason::Empty);
                    closed += 1;
                }
                Err(HostError::NotFound) => {
                    self.transient.mark_not_empty(id);
                }
                Err(e) => {
                    tracing::warn!(tab = %id, "Close request failed: {}", e);
                    self.metrics.record_close_failure();
                }
            }
        }

        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock host for testing: a mutable tab set plus a closure log. A fetch
    // override makes get_tab answer with newer state than list_tabs reported,
    // like a navigation landing mid-sweep.
    struct MockHost {
        tabs: Mutex<Vec<TabSnapshot>>,
        closed: Mutex<Vec<TabId>>,
        fetch_overrides: Mutex<HashMap<TabId, TabSnapshot>>,
        deny_close: bool,
    }

    impl MockHost {
        fn new(tabs: Vec<TabSnapshot>) -> Self {
            Self {
                tabs: Mutex::new(tabs),
                closed: Mutex::new(Vec::new()),
                fetch_overrides: Mutex::new(HashMap::new()),
                deny_close: false,
            }
        }

        fn denying(tabs: Vec<TabSnapshot>) -> Self {
            Self {
                deny_close: true,
                ..Self::new(tabs)
            }
        }

        fn override_fetch(&self, snapshot: TabSnapshot) {
            self.fetch_overrides.lock().unwrap().insert(snapshot.id, snapshot);
        }

        fn closed_ids(&self) -> Vec<TabId> {
            self.closed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TabHost for MockHost {
        async fn list_tabs(&self) -> Result<Vec<TabSnapshot>, HostError> {
            Ok(self.tabs.lock().unwrap().clone())
        }

        async fn get_tab(&self, id: TabId) -> Result<Option<TabSnapshot>, HostError> {
            if let Some(fresh) = self.fetch_overrides.lock().unwrap().get(&id) {
                return Ok(Some(fresh.clone()));
            }
            Ok(self.tabs.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn close_tab(&self, id: TabId) -> Result<(), HostError> {
            if self.deny_close {
                return Err(HostError::Denied("policy".into()));
            }
            let mut tabs = self.tabs.lock().unwrap();
            let before = tabs.len();
            tabs.retain(|t| t.id != id);
            if tabs.len() == before {
                return Err(HostError::NotFound);
            }
            self.closed.lock().unwrap().push(id);
            Ok(())
        }

        async fn reopen_tab(
            &self,
            tab: &tabpulse_domain::TabDescriptor,
            _focused: bool,
        ) -> Result<TabId, HostError> {
            let mut tabs = self.tabs.lock().unwrap();
            let id = TabId::new(1000 + tabs.len() as u64);
            tabs.push(TabSnapshot {
                id,
                url: Some(tab.url.clone()),
                title: tab.title.clone(),
                active: false,
                audible: false,
            });
            Ok(id)
        }
    }

    // Mock record store with a switchable outage
    struct MockRecordStore {
        records: Mutex<HashMap<String, serde_json::Value>>,
        unavailable: bool,
    }

    impl MockRecordStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                unavailable: false,
            }
        }

        fn with_policy(policy: &PolicyConfig) -> Self {
            let store = Self::new();
            store.records.lock().unwrap().insert(
                keys::POLICY_CONFIG.to_string(),
                serde_json::to_value(policy).unwrap(),
            );
            store
        }

        fn offline() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                unavailable: true,
            }
        }
    }

    #[async_trait]
    impl RecordStore for MockRecordStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            if self.unavailable {
                return Err(StoreError::Unavailable("offline".into()));
            }
            Ok(self.records.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
            if self.unavailable {
                return Err(StoreError::Unavailable("offline".into()));
            }
            self.records.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }

    fn tab(id: u64, url: &str) -> TabSnapshot {
        TabSnapshot {
            id: TabId::new(id),
            url: Some(url.to_string()),
            title: None,
            active: false,
            audible: false,
        }
    }

    fn sweeper_with(
        tabs: Vec<TabSnapshot>,
        policy: &PolicyConfig,
    ) -> Sweeper<MockHost, MockRecordStore> {
        Sweeper::new(
            MockHost::new(tabs),
            MockRecordStore::with_policy(policy),
            SweepConfig::default(),
        )
    }

    const MIN: u64 = 60_000;

    #[tokio::test]
    async fn test_bootstrap_rebuilds_ledgers() {
        let tabs = vec![tab(1, "https://a.example"), tab(2, "about:blank")];
        let mut sweeper = sweeper_with(tabs, &PolicyConfig::default());

        sweeper.bootstrap(1_000).await.unwrap();

        let snapshot = sweeper.snapshot(1_000);
        assert_eq!(snapshot.tracked_tabs, 2);
        assert_eq!(snapshot.transient_tabs, 1);
    }

    #[tokio::test]
    async fn test_stale_tab_closed_and_untracked() {
        let mut sweeper = sweeper_with(vec![tab(1, "https://a.example")], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "https://a.example"), 0);

        let report = sweeper.sweep(21 * MIN).await.unwrap();

        assert_eq!(report.closed_inactive, 1);
        assert_eq!(sweeper.host.closed_ids(), vec![TabId::new(1)]);
        assert!(!sweeper.activity.contains(TabId::new(1)));
    }

    #[tokio::test]
    async fn test_fresh_tab_survives() {
        let mut sweeper = sweeper_with(vec![tab(1, "https://a.example")], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "https://a.example"), 0);

        let report = sweeper.sweep(19 * MIN).await.unwrap();

        assert_eq!(report.closed_inactive, 0);
        assert!(sweeper.host.closed_ids().is_empty());
    }

    #[tokio::test]
    async fn test_skip_rules_beat_age() {
        let mut protected = tab(1, "chrome://settings");
        let mut active = tab(2, "https://a.example");
        active.active = true;
        let mut audible = tab(3, "https://b.example");
        audible.audible = true;

        let tabs = vec![protected.clone(), active.clone(), audible.clone()];
        let mut sweeper = sweeper_with(tabs, &PolicyConfig::default());
        for t in [&mut protected, &mut active, &mut audible] {
            sweeper.on_tab_created(t, 0);
        }

        // Far past the timeout for all three
        let report = sweeper.sweep(500 * MIN).await.unwrap();

        assert_eq!(report.closed_inactive, 0);
        assert!(sweeper.host.closed_ids().is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_grace_then_evict() {
        // Tab the engine has never seen: first sweep only starts tracking
        let mut sweeper = sweeper_with(vec![tab(1, "https://a.example")], &PolicyConfig::default());

        let report = sweeper.sweep(0).await.unwrap();
        assert_eq!(report.closed_inactive, 0);
        assert!(sweeper.activity.contains(TabId::new(1)));

        // Next sweep past the timeout closes it
        let report = sweeper.sweep(21 * MIN).await.unwrap();
        assert_eq!(report.closed_inactive, 1);
    }

    #[tokio::test]
    async fn test_disabled_policy_aborts_pass() {
        let policy = PolicyConfig {
            inactivity_eviction_enabled: false,
            ..Default::default()
        };
        let mut sweeper = sweeper_with(vec![tab(1, "https://a.example")], &policy);
        sweeper.on_tab_created(&tab(1, "https://a.example"), 0);

        let report = sweeper.sweep(100 * MIN).await.unwrap();
        assert_eq!(report.closed_inactive, 0);
    }

    #[tokio::test]
    async fn test_empty_tab_closed_after_timeout() {
        let mut sweeper = sweeper_with(vec![tab(1, "chrome://newtab/")], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "chrome://newtab/"), 0);

        // 90s: still within the 120s window
        let report = sweeper.sweep(90_000).await.unwrap();
        assert_eq!(report.closed_empty, 0);

        // 125s: evicted
        let report = sweeper.sweep(125_000).await.unwrap();
        assert_eq!(report.closed_empty, 1);
        assert_eq!(sweeper.transient.len(), 0);
    }

    #[tokio::test]
    async fn test_empty_pass_reverifies_navigation() {
        let mut sweeper = sweeper_with(vec![tab(1, "about:blank")], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "about:blank"), 0);

        // Enumeration still reports the tab empty, but the navigation has
        // landed by the time the pass re-fetches it before closing
        sweeper.host.override_fetch(tab(1, "https://landed.example"));

        let report = sweeper.sweep(125_000).await.unwrap();
        assert_eq!(report.closed_empty, 0);
        assert!(sweeper.host.closed_ids().is_empty());
        // Re-verification untracked it without a close request
        assert_eq!(sweeper.transient.len(), 0);
    }

    #[tokio::test]
    async fn test_vanished_tab_treated_as_gone() {
        let mut sweeper = sweeper_with(vec![], &PolicyConfig::default());
        // Tracked as empty, but the tab no longer exists in the host
        sweeper.transient.mark_empty(TabId::new(7), 0);

        let report = sweeper.sweep(125_000).await.unwrap();
        assert_eq!(report.closed_empty, 0);
        assert_eq!(sweeper.transient.len(), 0);
    }

    #[tokio::test]
    async fn test_denied_close_retained_for_retry() {
        let host = MockHost::denying(vec![tab(1, "https://a.example")]);
        let store = MockRecordStore::with_policy(&PolicyConfig::default());
        let mut sweeper = Sweeper::new(host, store, SweepConfig::default());
        sweeper.on_tab_created(&tab(1, "https://a.example"), 0);

        let report = sweeper.sweep(21 * MIN).await.unwrap();

        assert_eq!(report.closed_inactive, 0);
        // Ledger entry kept so the next sweep tries again
        assert!(sweeper.activity.contains(TabId::new(1)));
        assert_eq!(sweeper.metrics().close_failures, 1);
    }

    #[tokio::test]
    async fn test_store_outage_aborts_cycle() {
        let mut sweeper = Sweeper::new(
            MockHost::new(vec![tab(1, "https://a.example")]),
            MockRecordStore::offline(),
            SweepConfig::default(),
        );

        assert!(matches!(
            sweeper.sweep(1_000).await,
            Err(SweepError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_update_event_reclassifies() {
        let mut sweeper = sweeper_with(vec![], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "about:blank"), 0);
        assert!(sweeper.transient.contains(TabId::new(1)));

        let change = TabChange {
            url: Some("https://landed.example".to_string()),
            load_complete: true,
        };
        sweeper.on_tab_updated(TabId::new(1), &change, 5_000);

        assert!(!sweeper.transient.contains(TabId::new(1)));
        assert_eq!(sweeper.activity.last_active(TabId::new(1)), Some(5_000));
    }

    #[tokio::test]
    async fn test_removed_event_clears_both_ledgers() {
        let mut sweeper = sweeper_with(vec![], &PolicyConfig::default());
        sweeper.on_tab_created(&tab(1, "about:blank"), 0);
        sweeper.on_tab_removed(TabId::new(1));

        assert!(!sweeper.activity.contains(TabId::new(1)));
        assert!(!sweeper.transient.contains(TabId::new(1)));
    }
}
