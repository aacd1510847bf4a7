//! Semantic ID generation.
//!
//! IDs are unique within one walk only. A re-walk starts from an empty
//! allocator, so unlabeled elements may get different counters after the
//! page changes.

use std::collections::HashSet;

use super::classify::{is_labelable, is_submit_like};
use super::labels::resolve_label;
use super::snapshot::{DomTree, ElementNode};

const SUBMIT_ID_LEN: usize = 20;
const LABEL_ID_LEN: usize = 30;
const LABEL_SUFFIXES: usize = 10;
const COUNTER_LIMIT: usize = 100;

/// Lowercase ASCII slug: runs of anything else become one hyphen.
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.len() > max_len {
        slug.truncate(max_len);
    }
    slug.trim_end_matches('-').to_string()
}

/// Issues IDs for one walk.
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    fn claim(&mut self, candidate: &str) -> bool {
        !candidate.is_empty() && self.used.insert(candidate.to_string())
    }

    /// Allocate an ID for the element at `index`. Never fails.
    pub fn allocate(&mut self, tree: &DomTree, index: usize, el: &ElementNode) -> String {
        for attr in ["id", "name"] {
            if let Some(value) = el.non_empty_attr(attr) {
                if self.claim(value) {
                    return value.to_string();
                }
            }
        }

        if is_submit_like(el) {
            let text = if el.tag == "input" {
                el.attr("value").unwrap_or_default().to_string()
            } else {
                tree.full_text(index)
            };
            let slug = slugify(&text, usize::MAX);
            if !slug.is_empty() {
                let candidate = slugify(&format!("submit-{}", slug), SUBMIT_ID_LEN);
                if self.claim(&candidate) {
                    return candidate;
                }
            }
            if self.claim("form-submit") {
                return "form-submit".to_string();
            }
        }

        if is_labelable(el) {
            if let Some(label) = resolve_label(tree, index) {
                let slug = slugify(&label, LABEL_ID_LEN);
                if self.claim(&slug) {
                    return slug;
                }
                if !slug.is_empty() {
                    for n in 1..=LABEL_SUFFIXES {
                        let candidate = format!("{}-{}", slug, n);
                        if self.claim(&candidate) {
                            return candidate;
                        }
                    }
                }
            }
        }

        let base = match el.tag.as_str() {
            "input" => el.input_type().unwrap_or_else(|| "text".to_string()),
            tag => tag.to_string(),
        };
        let base = slugify(&base, LABEL_ID_LEN);
        for n in 1..=COUNTER_LIMIT {
            let candidate = format!("{}-{}", base, n);
            if self.claim(&candidate) {
                return candidate;
            }
        }

        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let candidate = format!("{}-{}", base, stamp);
            if self.claim(&candidate) {
                return candidate;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::snapshot::fixtures::SnapshotBuilder;
    use serde_json::json;

    fn allocate_all(b: SnapshotBuilder, indices: &[usize]) -> Vec<String> {
        let tree = DomTree::from_value(b.build()).unwrap();
        let mut ids = IdAllocator::new();
        indices
            .iter()
            .map(|&i| ids.allocate(&tree, i, tree.element(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("E-mail Address", 30), "e-mail-address");
        assert_eq!(slugify("  Hello,   World!! ", 30), "hello-world");
        assert_eq!(slugify("Ünïcode only", 30), "n-code-only");
        assert_eq!(slugify("***", 30), "");
        assert_eq!(slugify("submit-create new account", 20), "submit-create-new-ac");
        assert_eq!(slugify("submit-create new", 14), "submit-create");
    }

    #[test]
    fn test_id_and_name_first() {
        let mut b = SnapshotBuilder::new();
        let a = b.input(0, "text", json!({"id": "username", "name": "user"}), "");
        let c = b.input(0, "text", json!({"id": "username", "name": "user"}), "");
        let d = b.input(0, "text", json!({"id": "username", "name": "user"}), "");
        assert_eq!(allocate_all(b, &[a, c, d]), vec!["username", "user", "text-1"]);
    }

    #[test]
    fn test_submit_buttons() {
        let mut b = SnapshotBuilder::new();
        let first = b.element(0, "button", json!({}));
        b.text(first, "Create new account");
        let second = b.element(0, "button", json!({"type": "submit"}));
        b.text(second, "Create new account");
        let third = b.element(0, "button", json!({}));
        let plain = b.element(0, "button", json!({"type": "button"}));
        assert_eq!(
            allocate_all(b, &[first, second, third, plain]),
            vec!["submit-create-new-ac", "form-submit", "button-1", "button-2"]
        );
    }

    #[test]
    fn test_same_label_in_two_forms() {
        let mut b = SnapshotBuilder::new();
        let mut inputs = Vec::new();
        for _ in 0..2 {
            let form = b.element(0, "form", json!({}));
            let label = b.element(form, "label", json!({}));
            b.text(label, "Email");
            inputs.push(b.input(label, "email", json!({}), ""));
        }
        assert_eq!(allocate_all(b, &inputs), vec!["email", "email-1"]);
    }

    #[test]
    fn test_label_suffixes_exhaust_to_counter() {
        let mut b = SnapshotBuilder::new();
        let inputs: Vec<usize> = (0..12)
            .map(|_| b.input(0, "text", json!({"placeholder": "Tag"}), ""))
            .collect();
        let ids = allocate_all(b, &inputs);
        assert_eq!(ids[0], "tag");
        assert_eq!(ids[10], "tag-10");
        assert_eq!(ids[11], "text-1");
    }

    #[test]
    fn test_counter_then_timestamp() {
        let mut b = SnapshotBuilder::new();
        let links: Vec<usize> = (0..102)
            .map(|_| b.element(0, "a", json!({"href": "#"})))
            .collect();
        let ids = allocate_all(b, &links);
        assert_eq!(ids[0], "a-1");
        assert_eq!(ids[99], "a-100");
        assert!(ids[100].starts_with("a-"));
        assert_ne!(ids[100], ids[101]);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
