//! TabPulse Usage Aggregator
//!
//! Maintains per-day open/close counters in the persistent record store,
//! independent of the eviction ledgers. The embedder calls
//! [`UsageAggregator::record_opened`] / [`UsageAggregator::record_closed`]
//! from the host's created/removed events.
//!
//! # Lost-update prevention
//!
//! The record store's read-then-write is not atomic, so two racing events
//! could each read the same persisted map and one increment would vanish.
//! The whole day map lives under a single stored record, so every
//! read-modify-write is serialized through one async mutex guarding that
//! record. A burst of N events always totals N, even when the events fall
//! on different days.

#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tabpulse_domain::{keys, DailyStats, RecordStore, StoreError};
use tokio::sync::Mutex;

/// Calendar-day key (UTC) for a millisecond timestamp
///
/// # Examples
///
/// ```
/// assert_eq!(tabpulse_stats::day_key(0), "1970-01-01");
/// assert_eq!(tabpulse_stats::day_key(1_756_425_600_000), "2025-08-29");
/// ```
pub fn day_key(now_ms: u64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    dt.format("%Y-%m-%d").to_string()
}

enum Counter {
    Opened,
    Closed,
}

/// Per-day usage counters over the record store
///
/// Day records are created lazily on the first event of a new day and never
/// deleted. Nothing is cached between operations; each call reads the
/// persisted map fresh.
pub struct UsageAggregator<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: RecordStore> UsageAggregator<S> {
    /// Create an aggregator over a record store
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a tab-opened event at the given time
    pub async fn record_opened(&self, now_ms: u64) -> Result<(), StoreError> {
        self.bump(now_ms, Counter::Opened).await
    }

    /// Record a tab-closed event at the given time
    pub async fn record_closed(&self, now_ms: u64) -> Result<(), StoreError> {
        self.bump(now_ms, Counter::Closed).await
    }

    /// Read the full day→stats map
    ///
    /// A malformed persisted map is treated as empty rather than an error;
    /// the next recorded event rebuilds it.
    pub async fn daily_stats(&self) -> Result<HashMap<String, DailyStats>, StoreError> {
        Ok(match self.store.get(keys::DAILY_STATS).await? {
            Some(value) => parse_stats(value),
            None => HashMap::new(),
        })
    }

    async fn bump(&self, now_ms: u64, counter: Counter) -> Result<(), StoreError> {
        let day = day_key(now_ms);
        // The full day map is one stored record, so updates for different
        // days still contend on the same read-then-write
        let _guard = self.write_lock.lock().await;

        let mut stats = self.daily_stats().await.inspect_err(|e| {
            tracing::warn!("Usage increment dropped, store unreachable: {}", e);
        })?;

        let entry = stats
            .entry(day.clone())
            .or_insert_with(|| DailyStats::new(day.clone()));
        match counter {
            Counter::Opened => entry.opened += 1,
            Counter::Closed => entry.closed += 1,
        }
        tracing::debug!(day = %day, opened = entry.opened, closed = entry.closed, "Usage updated");

        let value = serde_json::to_value(&stats).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.store.set(keys::DAILY_STATS, value).await.inspect_err(|e| {
            tracing::warn!("Usage increment dropped, store unreachable: {}", e);
        })
    }
}

fn parse_stats(value: serde_json::Value) -> HashMap<String, DailyStats> {
    match serde_json::from_value(value) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!("Stored daily stats unreadable, starting fresh: {}", e);
            HashMap::new()
        }
    }
}
