//! TabPulse Storage Layer
//!
//! Implements the `RecordStore` trait. The real persistent store lives in
//! the host environment and is reached through whatever bridge the embedder
//! supplies; this crate ships [`MemoryStore`], an in-memory implementation
//! suitable for embedding, demos, and tests.
//!
//! # Examples
//!
//! ```
//! use tabpulse_store::MemoryStore;
//! use tabpulse_domain::RecordStore;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryStore::new();
//! store.set("policyConfig", json!({"empty_timeout_ms": 60000})).await.unwrap();
//! assert!(store.get("policyConfig").await.unwrap().is_some());
//! # }
//! ```

#![warn(missing_docs)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tabpulse_domain::{RecordStore, StoreError};
use tokio::sync::Mutex;

/// In-memory `RecordStore` backed by a JSON map
///
/// Get and set are independent async steps, like the real store: a
/// read-then-write sequence here is not atomic, so the same serialization
/// requirements apply to callers. [`MemoryStore::yielding`] widens the
/// window between suspension points, which lets tests surface
/// read-modify-write races deterministically enough to catch regressions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
    yield_on_access: bool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that yields to the scheduler on every access
    pub fn yielding() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            yield_on_access: true,
        }
    }

    /// Number of records currently stored
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.yield_on_access {
            tokio::task::yield_now().await;
        }
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.yield_on_access {
            tokio::task::yield_now().await;
        }
        self.records.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
