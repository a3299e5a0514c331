//! Record store key layout
//!
//! The persistent store is a flat namespace of named JSON records; these are
//! the keys the engine owns.

/// Eviction policy record ([`crate::PolicyConfig`])
pub const POLICY_CONFIG: &str = "policyConfig";

/// Map of day key to [`crate::DailyStats`]
pub const DAILY_STATS: &str = "dailyStats";

/// Ordered list of [`crate::Session`]
pub const SESSIONS: &str = "sessions";
