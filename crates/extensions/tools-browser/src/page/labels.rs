//! Human-readable labels for interactive elements.

use super::classify::is_labelable;
use super::snapshot::{DomTree, ElementNode, SnapshotNode};

/// Sibling text shorter than this can serve as a label.
const MAX_SIBLING_LABEL: usize = 100;
const MAX_DISPLAY_LEN: usize = 80;

/// Trim whitespace and trailing `:`/`*` markers.
pub fn clean_label(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
        .trim()
        .to_string()
}

fn non_empty(text: String) -> Option<String> {
    let cleaned = clean_label(&text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn is_control(el: &ElementNode) -> bool {
    matches!(el.tag.as_str(), "input" | "select" | "textarea" | "button")
}

/// Whether `index` is or wraps a control; such nodes label that control.
fn holds_control(tree: &DomTree, index: usize) -> bool {
    tree.subtree(index)
        .into_iter()
        .any(|i| tree.element(i).is_some_and(is_control))
}

/// Resolve the label of a form control at `index`.
///
/// Tried in order: `<label for>`, enclosing `<label>`, `aria-label`,
/// `placeholder`, a preceding sibling that looks like a label, then the
/// nearest short preceding sibling text.
pub fn resolve_label(tree: &DomTree, index: usize) -> Option<String> {
    let el = tree.element(index)?;

    if let Some(id) = el.non_empty_attr("id") {
        let by_for = (0..tree.len()).find_map(|i| {
            let candidate = tree.element(i)?;
            if candidate.tag == "label" && candidate.attr("for") == Some(id) {
                non_empty(tree.full_text(i))
            } else {
                None
            }
        });
        if by_for.is_some() {
            return by_for;
        }
    }

    let enclosing = tree
        .ancestors(index)
        .find(|&a| tree.element(a).is_some_and(|e| e.tag == "label"));
    if let Some(label) = enclosing.and_then(|l| non_empty(tree.full_text_excluding(l, Some(index))))
    {
        return Some(label);
    }

    if let Some(aria) = el.non_empty_attr("aria-label") {
        return Some(clean_label(aria));
    }
    if let Some(placeholder) = el.non_empty_attr("placeholder") {
        return Some(clean_label(placeholder));
    }

    let siblings: Vec<usize> = tree
        .preceding_siblings(index)
        .into_iter()
        .filter(|&s| !holds_control(tree, s))
        .collect();

    let marked = siblings
        .iter()
        .find_map(|&s| tree.element(s).map(|sibling| (s, sibling)));
    if let Some((s, sibling)) = marked {
        let text = tree.full_text(s);
        let trimmed = text.trim_end();
        if sibling.tag == "label" || trimmed.ends_with(':') || trimmed.ends_with('*') {
            if let Some(label) = non_empty(text) {
                return Some(label);
            }
        }
    }

    siblings.into_iter().find_map(|s| {
        let text = match tree.node(s)? {
            SnapshotNode::Text { text, .. } => text.clone(),
            SnapshotNode::Element(_) => tree.full_text(s),
        };
        let len = text.trim().chars().count();
        if (1..MAX_SIBLING_LABEL).contains(&len) {
            non_empty(text)
        } else {
            None
        }
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Text shown for an element in the manifest.
pub fn display_text(tree: &DomTree, index: usize, el: &ElementNode) -> String {
    let input_type = el.input_type();
    let is_button_input = el.tag == "input"
        && matches!(input_type.as_deref(), Some("submit" | "button" | "reset" | "image"));

    let text = if is_button_input {
        el.non_empty_attr("value")
            .map(str::to_string)
            .or_else(|| el.non_empty_attr("aria-label").map(str::to_string))
            .unwrap_or_else(|| match input_type.as_deref() {
                Some("reset") => "Reset".to_string(),
                _ => "Submit".to_string(),
            })
    } else if is_labelable(el) {
        resolve_label(tree, index)
            .or_else(|| el.non_empty_attr("name").map(str::to_string))
            .or_else(|| el.non_empty_attr("title").map(str::to_string))
            .unwrap_or_else(|| input_type.unwrap_or_else(|| el.tag.clone()))
    } else {
        non_empty(tree.full_text(index))
            .or_else(|| el.non_empty_attr("aria-label").map(str::to_string))
            .or_else(|| el.non_empty_attr("title").map(str::to_string))
            .or_else(|| el.non_empty_attr("alt").map(str::to_string))
            .unwrap_or_default()
    };
    truncate(&text, MAX_DISPLAY_LEN)
}
