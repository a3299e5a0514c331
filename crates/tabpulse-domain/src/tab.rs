//! Tab types - the unit the engine tracks and evicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// New-tab placeholder URL used by the host for freshly opened tabs.
pub const NEW_TAB_URL: &str = "chrome://newtab/";

/// Blank-page sentinel URL.
pub const BLANK_URL: &str = "about:blank";

/// Host-assigned identifier for a tab
///
/// Ids are unique among currently-open tabs but may be reused by the host
/// after a tab closes, so they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabId(u64);

impl TabId {
    /// Wrap a raw host id
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw host id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time view of one tab as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSnapshot {
    /// Host-assigned id
    pub id: TabId,

    /// Current URL; `None` while the tab has not committed a navigation
    pub url: Option<String>,

    /// Current title, if any
    pub title: Option<String>,

    /// Whether this is the tab currently focused by the user
    pub active: bool,

    /// Whether the tab is currently emitting audio
    pub audible: bool,
}

impl TabSnapshot {
    /// Whether this tab is classified "empty" (placeholder/blank content)
    pub fn is_empty(&self) -> bool {
        is_empty_url(self.url.as_deref())
    }

    /// Whether this tab's URL starts with any of the given protected prefixes
    pub fn is_protected(&self, prefixes: &[String]) -> bool {
        match &self.url {
            Some(url) => prefixes.iter().any(|p| url.starts_with(p.as_str())),
            None => false,
        }
    }
}

/// The persisted shape of a tab inside a saved session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabDescriptor {
    /// URL to reopen
    pub url: String,

    /// Title at capture time
    pub title: Option<String>,
}

/// Payload of a tab-updated event from the host
///
/// Mirrors the host's change-info object: only the fields that changed are
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabChange {
    /// New URL, when the tab navigated
    pub url: Option<String>,

    /// Whether the tab finished loading in this update
    pub load_complete: bool,
}

/// Classify a URL as "empty" content
///
/// A tab counts as empty when its URL is the new-tab placeholder, the blank
/// sentinel, or absent entirely.
///
/// # Examples
///
/// ```
/// use tabpulse_domain::is_empty_url;
///
/// assert!(is_empty_url(Some("chrome://newtab/")));
/// assert!(is_empty_url(Some("about:blank")));
/// assert!(is_empty_url(None));
/// assert!(!is_empty_url(Some("https://example.com")));
/// ```
pub fn is_empty_url(url: Option<&str>) -> bool {
    match url {
        Some(u) => u == NEW_TAB_URL || u == BLANK_URL || u.is_empty(),
        None => true,
    }
}
