//! Common types shared across crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form key/value data attached to results. Ordered so serialized
/// results are stable line to line.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// What a tool does to the page it is pointed at.
///
/// Controllers use this to decide which calls can be retried blindly:
/// `Observe` never changes the page, `Interact` dispatches events into the
/// current document, `Navigate` replaces the document or the tab itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageEffect {
    #[default]
    Observe,
    Interact,
    Navigate,
}

impl PageEffect {
    /// Safe to repeat without changing the page.
    pub fn is_read_only(self) -> bool {
        self == PageEffect::Observe
    }
}

/// Extension version (`major.minor.patch`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
#[path = "common_tests.rs"]
mod tests;
