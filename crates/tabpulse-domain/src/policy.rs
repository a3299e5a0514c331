//! Eviction policy configuration
//!
//! Persisted under [`crate::keys::POLICY_CONFIG`]; written by the settings
//! surface, read by the sweep engine at every pass.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configurable eviction policy
///
/// Defaults are written once at first install and used as the fallback
/// whenever the persisted record is missing or malformed.
///
/// # Examples
///
/// ```
/// use tabpulse_domain::PolicyConfig;
///
/// let policy = PolicyConfig::default();
/// assert!(policy.inactivity_eviction_enabled);
/// assert_eq!(policy.inactivity_timeout_minutes, 20);
/// assert_eq!(policy.empty_timeout_ms, 120_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether the inactivity eviction pass runs at all
    #[serde(default = "default_inactivity_enabled")]
    pub inactivity_eviction_enabled: bool,

    /// Close a tab after this many minutes without activity
    /// Default: 20 minutes
    #[serde(default = "default_inactivity_timeout_minutes")]
    pub inactivity_timeout_minutes: u64,

    /// Whether the empty-tab eviction pass runs at all
    #[serde(default = "default_empty_enabled")]
    pub empty_eviction_enabled: bool,

    /// Close an empty tab after it has sat unused for this long (ms)
    /// Default: 120000 (2 minutes)
    #[serde(default = "default_empty_timeout_ms")]
    pub empty_timeout_ms: u64,
}

fn default_inactivity_enabled() -> bool {
    true
}

fn default_inactivity_timeout_minutes() -> u64 {
    20
}

fn default_empty_enabled() -> bool {
    true
}

fn default_empty_timeout_ms() -> u64 {
    120_000
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            inactivity_eviction_enabled: default_inactivity_enabled(),
            inactivity_timeout_minutes: default_inactivity_timeout_minutes(),
            empty_eviction_enabled: default_empty_enabled(),
            empty_timeout_ms: default_empty_timeout_ms(),
        }
    }
}

impl PolicyConfig {
    /// Inactivity timeout in milliseconds
    ///
    /// Saturates: a stored minute count near `u64::MAX` parses fine and must
    /// not panic the conversion.
    pub fn inactivity_timeout_ms(&self) -> u64 {
        self.inactivity_timeout_minutes.saturating_mul(60_000)
    }

    /// Inactivity timeout as a Duration
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms())
    }

    /// Empty-tab timeout as a Duration
    pub fn empty_timeout(&self) -> Duration {
        Duration::from_millis(self.empty_timeout_ms)
    }

    /// Parse a persisted JSON value, falling back to defaults when the
    /// record is malformed or holds invalid values (zero timeouts)
    ///
    /// The engine must never fail a sweep because stored settings are
    /// corrupt, so this is total.
    pub fn from_stored(value: serde_json::Value) -> Self {
        match serde_json::from_value::<PolicyConfig>(value) {
            Ok(policy) if policy.is_valid() => policy,
            _ => PolicyConfig::default(),
        }
    }

    /// Both timeouts must be positive
    pub fn is_valid(&self) -> bool {
        self.inactivity_timeout_minutes > 0 && self.empty_timeout_ms > 0
    }
}
