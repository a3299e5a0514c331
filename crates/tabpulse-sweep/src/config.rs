//! Configuration for the sweep engine
//!
//! Engine-level settings (cadence, protected URL prefixes) live here and are
//! fixed at startup. The user-tunable eviction policy is a separate persisted
//! record (`PolicyConfig`) re-read at every sweep.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tabpulse_domain::{keys, PolicyConfig, RecordStore, StoreError};

/// Configuration for the sweep engine
///
/// One timer with one cadence drives every eviction pass. The cadence is
/// configured once at startup and owned by the worker; nothing else in the
/// system registers timers.
///
/// # Examples
///
/// ```
/// use tabpulse_sweep::SweepConfig;
///
/// let config = SweepConfig::default();
/// assert_eq!(config.sweep_interval_secs, 60);
/// assert!(config.protected_prefixes.iter().any(|p| p == "chrome://"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// How often the sweep fires (in seconds)
    /// Default: 60
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// URL prefixes the engine never evicts (internal browser pages, the
    /// extension's own pages)
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_protected_prefixes() -> Vec<String> {
    vec!["chrome://".to_string(), "chrome-extension://".to_string()]
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            protected_prefixes: default_protected_prefixes(),
        }
    }
}

impl SweepConfig {
    /// Sweep cadence as a Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Write default eviction policy on first install
///
/// Writes [`PolicyConfig::default`] under the policy key only when no record
/// exists yet, so user edits are never overwritten. Returns `true` when
/// defaults were written.
pub async fn ensure_policy_defaults<S: RecordStore>(store: &S) -> Result<bool, StoreError> {
    if store.get(keys::POLICY_CONFIG).await?.is_some() {
        return Ok(false);
    }

    let defaults = serde_json::to_value(PolicyConfig::default())
        .map_err(|e| StoreError::Malformed(e.to_string()))?;
    store.set(keys::POLICY_CONFIG, defaults).await?;
    tracing::info!("Installed default eviction policy");
    Ok(true)
}
