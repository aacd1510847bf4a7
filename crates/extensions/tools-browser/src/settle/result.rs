//! Settlement verdict.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::driver::DialogKind;

/// What changed during a settlement attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleChanges {
    pub dom_mutations: bool,
    /// Relevant mutation records seen by the watcher.
    pub mutation_count: u64,
    pub new_elements: u64,
    pub removed_elements: u64,
    pub network_activity: bool,
    pub url_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_type: Option<DialogKind>,
}

/// Result of one settlement attempt. Always produced, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResult {
    /// At least one settlement signal fired before the timeout.
    pub settled: bool,
    pub has_changes: bool,
    pub navigated: bool,
    pub dialog_handled: bool,
    pub changes: SettleChanges,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl SettleResult {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} in {}ms",
            if self.settled { "Settled" } else { "Not settled" },
            self.duration.as_millis()
        )];
        if self.changes.dom_mutations {
            parts.push(format!(
                "{} DOM mutations (+{}/-{} elements)",
                self.changes.mutation_count, self.changes.new_elements, self.changes.removed_elements
            ));
        } else {
            parts.push("no DOM changes".to_string());
        }
        if self.navigated {
            parts.push("navigated".to_string());
        }
        if let Some(kind) = self.changes.dialog_type {
            parts.push(format!("{} dialog accepted", kind));
        }
        if self.changes.network_activity {
            parts.push("network activity".to_string());
        }
        if let Some(error) = &self.error {
            parts.push(format!("error: {}", error));
        }
        parts.join(", ")
    }
}
