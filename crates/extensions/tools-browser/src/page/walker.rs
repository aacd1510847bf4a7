//! Page walker: render tree to manifest.
//!
//! A pre-order walk over the snapshot that emits a markdown outline with an
//! inline marker per interactive element, collects the element table and
//! the tags to write back into the live DOM.

use std::collections::{HashMap, HashSet};

use agentpage_config::WalkerConfig;
use serde_json::{json, Value};

use super::classify::{classify, ActionKind, Classification, TagKind};
use super::labels::display_text;
use super::manifest::{CurrentValue, InteractiveElement, Manifest};
use super::semantic_id::IdAllocator;
use super::snapshot::{DomTree, ElementNode, SnapshotNode};
use super::visibility::is_visible;

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "meta", "link", "head"];

/// Tags that render their own direct text, so their text children are not
/// emitted again.
const SELF_TEXT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "span", "label", "li"];

/// Tags that emit their full text and stop, unless they hold a control.
const FULL_TEXT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "label"];

/// One `data-mcp-*` tag to write onto the snapshot node at `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTag {
    pub index: usize,
    pub id: String,
    pub tag_kind: TagKind,
    pub action_kind: ActionKind,
}

impl ElementTag {
    /// `[index, id, type, action]`, the shape `applyTags` takes.
    pub fn to_value(&self) -> Value {
        json!([self.index, self.id, self.tag_kind.as_str(), self.action_kind.as_str()])
    }
}

#[derive(Debug, Clone)]
pub struct WalkOutput {
    pub manifest: Manifest,
    pub tags: Vec<ElementTag>,
}

/// Turns snapshots into manifests.
#[derive(Debug, Clone)]
pub struct PageWalker {
    config: WalkerConfig,
}

impl Default for PageWalker {
    fn default() -> Self {
        Self::new(WalkerConfig::default())
    }
}

impl PageWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Walk `tree` and build a manifest. IDs are fresh for every call.
    pub fn walk(&self, tree: &DomTree, url: &str, title: &str) -> WalkOutput {
        let mut walk = Walk {
            tree,
            config: &self.config,
            ids: IdAllocator::new(),
            lines: Vec::new(),
            elements: Vec::new(),
            tags: Vec::new(),
        };
        if let Some(root) = tree.root() {
            walk.run(root);
        }

        let mut content = String::new();
        if !title.is_empty() {
            content.push_str(&format!("# {}\n", title));
        }
        content.push_str(&format!("URL: {}\n", url));
        content.push_str(&format!("Interactive elements: {}\n", walk.elements.len()));
        if tree.truncated() {
            content.push_str(&format!(
                "_Page truncated after {} nodes; later content is not mapped._\n",
                tree.len()
            ));
        }
        content.push('\n');
        content.push_str(&walk.lines.join("\n"));

        let form_hints = walk.form_hints();
        if !form_hints.is_empty() {
            content.push_str("\n\n## Form Fill Hints\n");
            content.push_str(&form_hints.join("\n"));
        }
        let examples = walk.examples();
        if !examples.is_empty() {
            content.push_str("\n\n## Example Actions\n");
            content.push_str(&examples.join("\n"));
        }
        content.push('\n');

        WalkOutput {
            manifest: Manifest {
                content,
                elements: walk.elements,
                url: url.to_string(),
                title: title.to_string(),
            },
            tags: walk.tags,
        }
    }
}

struct Walk<'a> {
    tree: &'a DomTree,
    config: &'a WalkerConfig,
    ids: IdAllocator,
    lines: Vec<String>,
    elements: Vec<InteractiveElement>,
    tags: Vec<ElementTag>,
}

impl<'a> Walk<'a> {
    fn run(&mut self, root: usize) {
        let tree = self.tree;
        // (node, list depth)
        let mut stack = vec![(root, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let Some(node) = tree.node(index) else {
                continue;
            };
            let recurse_depth = match node {
                SnapshotNode::Text { parent, text } => {
                    self.visit_text(*parent, text);
                    None
                }
                SnapshotNode::Element(el) => self.visit_element(index, el, depth),
            };
            if let Some(child_depth) = recurse_depth {
                for &child in tree.children(index).iter().rev() {
                    stack.push((child, child_depth));
                }
            }
        }
    }

    fn visit_text(&mut self, parent: Option<usize>, text: &str) {
        let owned_by_parent = parent
            .and_then(|p| self.tree.element(p))
            .is_some_and(|p| SELF_TEXT_TAGS.contains(&p.tag.as_str()));
        if !owned_by_parent {
            self.push_text("", text);
        }
    }

    /// Returns the list depth for children, or `None` to stop here.
    fn visit_element(&mut self, index: usize, el: &ElementNode, depth: usize) -> Option<usize> {
        let tag = el.tag.as_str();
        if SKIP_TAGS.contains(&tag) || !is_visible(&el.style) {
            return None;
        }

        if let Some(class) = classify(el) {
            self.map_element(index, el, class, depth);
            return None;
        }

        let indent = "  ".repeat(depth.saturating_sub(1));
        match tag {
            "ul" | "ol" => Some(depth + 1),
            "li" => {
                let text = self.tree.direct_text(index);
                self.push_text(&format!("{}- ", indent), &text);
                Some(depth)
            }
            _ if FULL_TEXT_TAGS.contains(&tag) => {
                let prefix = heading_prefix(tag);
                if self.has_interactive_descendant(index) {
                    let text = self.tree.direct_text(index);
                    self.push_text(&prefix, &text);
                    Some(depth)
                } else {
                    let text = self.visible_text(index);
                    self.push_text(&prefix, &text);
                    None
                }
            }
            "div" | "span" => {
                let text = self.tree.direct_text(index);
                self.push_text("", &text);
                Some(depth)
            }
            _ => Some(depth),
        }
    }

    fn map_element(&mut self, index: usize, el: &ElementNode, class: Classification, depth: usize) {
        let id = self.ids.allocate(self.tree, index, el);
        let label = display_text(self.tree, index, el);
        let element = InteractiveElement {
            id: id.clone(),
            tag_kind: class.tag_kind,
            action_kind: class.action_kind,
            label,
            placeholder: el.attr("placeholder").unwrap_or_default().trim().to_string(),
            required: el.has_attr("required") || el.attr("aria-required") == Some("true"),
            current_value: self.current_value(index, el, class.action_kind),
            options: el.options.as_ref().map(|opts| {
                opts.iter()
                    .map(|o| o.text.clone())
                    .filter(|t| !t.is_empty())
                    .collect()
            }),
            input_type: if el.tag == "input" { el.input_type() } else { None },
        };

        let marker = self.marker(&element);
        self.lines.push(format!("{}{}", "  ".repeat(depth), marker));
        self.tags.push(ElementTag {
            index,
            id,
            tag_kind: class.tag_kind,
            action_kind: class.action_kind,
        });
        self.elements.push(element);
    }

    fn current_value(&self, index: usize, el: &ElementNode, action: ActionKind) -> CurrentValue {
        match action {
            ActionKind::Toggle => CurrentValue::Flag(el.checked.unwrap_or(false)),
            ActionKind::Select => {
                let selected = el
                    .options
                    .as_ref()
                    .and_then(|opts| opts.iter().find(|o| o.selected))
                    .map(|o| o.text.clone());
                CurrentValue::Text(selected.or_else(|| el.value.clone()).unwrap_or_default())
            }
            ActionKind::Fill | ActionKind::Adjust => {
                CurrentValue::Text(el.value.clone().unwrap_or_default())
            }
            ActionKind::Edit => CurrentValue::Text(self.tree.full_text(index)),
            ActionKind::Click | ActionKind::Upload => CurrentValue::Text(String::new()),
        }
    }

    fn marker(&self, el: &InteractiveElement) -> String {
        let mut line = format!(
            "**[{}: {}]** (ID: {})",
            el.action_kind.as_str().to_ascii_uppercase(),
            el.label,
            el.id
        );
        match (&el.action_kind, &el.current_value) {
            (ActionKind::Toggle, CurrentValue::Flag(true)) => line.push_str(" [checked]"),
            (ActionKind::Fill | ActionKind::Adjust, CurrentValue::Text(v))
                if !v.is_empty() && el.input_type.as_deref() != Some("password") =>
            {
                line.push_str(&format!(" = \"{}\"", truncate(v, self.config.max_text_len)));
            }
            _ => {}
        }
        if el.required {
            line.push_str(" (required)");
        }
        if let Some(options) = &el.options {
            let shown = self.config.option_preview.min(options.len());
            line.push_str(&format!(" Options: {}", options[..shown].join(", ")));
            if options.len() > shown {
                line.push_str(&format!(" (+{} more)", options.len() - shown));
            }
        }
        line
    }

    fn push_text(&mut self, prefix: &str, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.lines
                .push(format!("{}{}", prefix, truncate(text, self.config.max_text_len)));
        }
    }

    fn has_interactive_descendant(&self, index: usize) -> bool {
        self.visible_subtree(index)
            .into_iter()
            .skip(1)
            .any(|i| self.tree.element(i).and_then(classify).is_some())
    }

    /// Pre-order indices under `index`, pruning invisible elements.
    fn visible_subtree(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            if let Some(el) = self.tree.element(i) {
                if !is_visible(&el.style) || SKIP_TAGS.contains(&el.tag.as_str()) {
                    continue;
                }
            }
            out.push(i);
            stack.extend(self.tree.children(i).iter().rev());
        }
        out
    }

    fn visible_text(&self, index: usize) -> String {
        let parts: Vec<&str> = self
            .visible_subtree(index)
            .into_iter()
            .filter_map(|i| match self.tree.node(i) {
                Some(SnapshotNode::Text { text, .. }) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        parts.join(" ")
    }

    fn form_hints(&self) -> Vec<String> {
        // Snapshot index -> position in `elements`. An element belongs to
        // at most one form.
        let mapped: HashMap<usize, usize> = self
            .tags
            .iter()
            .enumerate()
            .map(|(position, tag)| (tag.index, position))
            .collect();
        let mut taken: HashSet<usize> = HashSet::new();
        let mut hints = Vec::new();
        let mut form_number = 0;
        for index in 0..self.tree.len() {
            let Some(form) = self.tree.element(index).filter(|e| e.tag == "form") else {
                continue;
            };
            form_number += 1;
            let fields = self.form_fields(index, &mapped, &mut taken);
            let Some(summary) = form_fill_summary(&fields) else {
                continue;
            };
            let name = form
                .non_empty_attr("id")
                .or_else(|| form.non_empty_attr("name"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("form-{}", form_number));
            hints.push(format!("- form_fill `{}`: {}", name, summary));
        }
        hints
    }

    /// Mapped form controls under the form at `form`, in document order.
    /// Links are navigation, not fields.
    fn form_fields(
        &self,
        form: usize,
        mapped: &HashMap<usize, usize>,
        taken: &mut HashSet<usize>,
    ) -> Vec<&InteractiveElement> {
        self.tree
            .subtree(form)
            .into_iter()
            .skip(1)
            .filter_map(|node| mapped.get(&node).copied())
            .filter(|&position| self.elements[position].tag_kind != TagKind::Link)
            .filter(|&position| taken.insert(position))
            .map(|position| &self.elements[position])
            .collect()
    }

    fn examples(&self) -> Vec<String> {
        self.elements
            .iter()
            .map(|el| {
                let verb = match el.action_kind {
                    ActionKind::Fill => "Fill",
                    ActionKind::Toggle => "Toggle",
                    ActionKind::Select => "Select in",
                    ActionKind::Click => "Click",
                    ActionKind::Adjust => "Set",
                    ActionKind::Upload => "Upload to",
                    ActionKind::Edit => "Edit",
                };
                let call = match example_value(el) {
                    Some(value) => format!("execute_action(\"{}\", {{\"value\": {}}})", el.id, value),
                    None => format!("execute_action(\"{}\")", el.id),
                };
                let mut line = format!("- {} \"{}\": {}", verb, el.label, call);
                if el.action_kind == ActionKind::Upload {
                    line.push_str(" (file upload is not supported)");
                }
                line
            })
            .collect()
    }
}

fn heading_prefix(tag: &str) -> String {
    match tag.strip_prefix('h').and_then(|n| n.parse::<usize>().ok()) {
        Some(level) => format!("{} ", "#".repeat(level)),
        None => String::new(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// `id: value` pairs for the value-taking fields, then the buttons to
/// press. `None` when the form has no mapped fields at all.
fn form_fill_summary(fields: &[&InteractiveElement]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let mut pairs = Vec::new();
    let mut clicks = Vec::new();
    for el in fields {
        match el.action_kind {
            ActionKind::Toggle => pairs.push(format!("{}: true", el.id)),
            ActionKind::Click => clicks.push(format!("`{}`", el.id)),
            ActionKind::Upload => pairs.push(format!("{}: (file upload is not supported)", el.id)),
            _ => {
                if let Some(value) = example_value(el) {
                    pairs.push(format!("{}: {}", el.id, value));
                }
            }
        }
    }
    let mut summary = pairs.join(", ");
    if !clicks.is_empty() {
        if !summary.is_empty() {
            summary.push_str("; then ");
        }
        summary.push_str(&format!("click {}", clicks.join(", ")));
    }
    (!summary.is_empty()).then_some(summary)
}

/// Placeholder value for an example call, as JSON text. `None` for
/// actions that take no value.
fn example_value(el: &InteractiveElement) -> Option<Value> {
    let value = match el.action_kind {
        ActionKind::Fill => match el.input_type.as_deref() {
            Some("email") => "user@example.com",
            Some("password") => "password123",
            Some("tel") => "+1234567890",
            Some("number") => "42",
            Some("url") => "https://example.com",
            Some("search") => "search query",
            Some("date") => "2024-01-15",
            Some("time") => "12:00",
            Some("datetime-local") => "2024-01-15T12:00",
            Some("month") => "2024-01",
            Some("week") => "2024-W03",
            _ => "Example text",
        },
        ActionKind::Adjust => match el.input_type.as_deref() {
            Some("color") => "#336699",
            _ => "50",
        },
        ActionKind::Select => {
            let first = el.options.as_ref()?.iter().find(|o| !o.trim().is_empty())?;
            return Some(json!(first));
        }
        ActionKind::Edit => "Example text",
        ActionKind::Toggle | ActionKind::Click | ActionKind::Upload => return None,
    };
    Some(json!(value))
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
