//! Manifest types and the diff between two walks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::classify::{ActionKind, TagKind};

/// Current value of an element: text for fields, a flag for toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrentValue {
    Flag(bool),
    Text(String),
}

impl Default for CurrentValue {
    fn default() -> Self {
        CurrentValue::Text(String::new())
    }
}

impl std::fmt::Display for CurrentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrentValue::Flag(b) => write!(f, "{}", b),
            CurrentValue::Text(s) => f.write_str(s),
        }
    }
}

/// One mapped element, as produced by a single walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    pub id: String,
    pub tag_kind: TagKind,
    pub action_kind: ActionKind,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    pub current_value: CurrentValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

/// Result of one walk. Replaced wholesale by the next walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub content: String,
    pub elements: Vec<InteractiveElement>,
    pub url: String,
    pub title: String,
}

impl Manifest {
    pub fn element(&self, id: &str) -> Option<&InteractiveElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// What changed between two manifests, by element id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Ids whose action or current value changed.
    pub changed: Vec<String>,
    pub url_changed: bool,
}

impl ManifestDiff {
    pub fn compute(prev: Option<&Manifest>, next: &Manifest) -> Self {
        let Some(prev) = prev else {
            return Self {
                added: next.elements.iter().map(|e| e.id.clone()).collect(),
                ..Self::default()
            };
        };

        let before: HashMap<&str, &InteractiveElement> =
            prev.elements.iter().map(|e| (e.id.as_str(), e)).collect();
        let after: HashMap<&str, &InteractiveElement> =
            next.elements.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut diff = Self {
            url_changed: prev.url != next.url,
            ..Self::default()
        };
        for el in &next.elements {
            match before.get(el.id.as_str()) {
                None => diff.added.push(el.id.clone()),
                Some(old)
                    if old.action_kind != el.action_kind
                        || old.current_value != el.current_value =>
                {
                    diff.changed.push(el.id.clone())
                }
                Some(_) => {}
            }
        }
        diff.removed = prev
            .elements
            .iter()
            .filter(|e| !after.contains_key(e.id.as_str()))
            .map(|e| e.id.clone())
            .collect();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty() && !self.url_changed
    }

    /// One-line summary, e.g. `+2 added (a, b), -1 removed (c)`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No element changes".to_string();
        }
        let mut parts = Vec::new();
        if self.url_changed {
            parts.push("page URL changed".to_string());
        }
        for (sign, label, ids) in [
            ("+", "added", &self.added),
            ("-", "removed", &self.removed),
            ("~", "changed", &self.changed),
        ] {
            if !ids.is_empty() {
                parts.push(format!("{}{} {} ({})", sign, ids.len(), label, preview(ids)));
            }
        }
        parts.join(", ")
    }
}

fn preview(ids: &[String]) -> String {
    const SHOWN: usize = 5;
    let mut text = ids.iter().take(SHOWN).cloned().collect::<Vec<_>>().join(", ");
    if ids.len() > SHOWN {
        text.push_str(&format!(", +{} more", ids.len() - SHOWN));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, value: CurrentValue) -> InteractiveElement {
        InteractiveElement {
            id: id.to_string(),
            tag_kind: TagKind::Input,
            action_kind: ActionKind::Fill,
            label: id.to_string(),
            placeholder: String::new(),
            required: false,
            current_value: value,
            options: None,
            input_type: Some("text".to_string()),
        }
    }

    fn manifest(url: &str, elements: Vec<InteractiveElement>) -> Manifest {
        Manifest {
            content: String::new(),
            elements,
            url: url.to_string(),
            title: String::new(),
        }
    }

    #[test]
    fn test_first_walk_adds_everything() {
        let next = manifest("u", vec![element("a", CurrentValue::default())]);
        let diff = ManifestDiff::compute(None, &next);
        assert_eq!(diff.added, vec!["a"]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_diff_added_removed_changed() {
        let prev = manifest(
            "u",
            vec![
                element("keep", CurrentValue::Text("x".into())),
                element("gone", CurrentValue::default()),
                element("edit", CurrentValue::Text("old".into())),
            ],
        );
        let next = manifest(
            "u",
            vec![
                element("keep", CurrentValue::Text("x".into())),
                element("edit", CurrentValue::Text("new".into())),
                element("new", CurrentValue::Flag(true)),
            ],
        );
        let diff = ManifestDiff::compute(Some(&prev), &next);
        assert_eq!(diff.added, vec!["new"]);
        assert_eq!(diff.removed, vec!["gone"]);
        assert_eq!(diff.changed, vec!["edit"]);
        assert!(!diff.url_changed);
        assert_eq!(
            diff.summary(),
            "+1 added (new), -1 removed (gone), ~1 changed (edit)"
        );
    }

    #[test]
    fn test_identical_manifests() {
        let m = manifest("u", vec![element("a", CurrentValue::default())]);
        let diff = ManifestDiff::compute(Some(&m), &m);
        assert!(diff.is_empty());
        assert_eq!(diff.summary(), "No element changes");
    }

    #[test]
    fn test_summary_truncates_long_lists() {
        let diff = ManifestDiff {
            added: (0..7).map(|i| format!("e{}", i)).collect(),
            url_changed: true,
            ..ManifestDiff::default()
        };
        assert_eq!(
            diff.summary(),
            "page URL changed, +7 added (e0, e1, e2, e3, e4, +2 more)"
        );
    }

    #[test]
    fn test_element_serializes_camel_case() {
        let json = serde_json::to_value(element("a", CurrentValue::Flag(false))).unwrap();
        assert_eq!(json["tagKind"], "input");
        assert_eq!(json["actionKind"], "fill");
        assert_eq!(json["currentValue"], false);
        assert!(json.get("options").is_none());
    }
}
