//! Host-side view of the render-tree snapshot taken by the agent script.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Computed style and geometry of an element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleInfo {
    /// Result of `checkVisibility()` where the browser supports it.
    pub native: Option<bool>,
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for StyleInfo {
    fn default() -> Self {
        Self {
            native: None,
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionInfo {
    pub value: String,
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub parent: Option<usize>,
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub style: StyleInfo,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<OptionInfo>>,
}

impl ElementNode {
    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute value, if present and not blank.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Lowercased `type` of an input, as reported by the DOM.
    pub fn input_type(&self) -> Option<String> {
        self.input_type
            .as_deref()
            .or_else(|| self.attr("type"))
            .map(|t| t.trim().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SnapshotNode {
    Element(ElementNode),
    Text { parent: Option<usize>, text: String },
}

impl SnapshotNode {
    pub fn parent(&self) -> Option<usize> {
        match self {
            SnapshotNode::Element(el) => el.parent,
            SnapshotNode::Text { parent, .. } => *parent,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    nodes: Vec<SnapshotNode>,
    #[serde(default)]
    truncated: bool,
}

/// Flat pre-order node list with child links.
///
/// Node indices are the indices the agent script uses for tagging.
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    nodes: Vec<SnapshotNode>,
    children: Vec<Vec<usize>>,
    truncated: bool,
}

impl DomTree {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let raw: RawSnapshot = serde_json::from_value(value)?;
        Ok(Self::from_nodes(raw.nodes, raw.truncated))
    }

    pub fn from_nodes(nodes: Vec<SnapshotNode>, truncated: bool) -> Self {
        let mut children = vec![Vec::new(); nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            // Parents always precede children; anything else is dropped.
            if let Some(parent) = node.parent().filter(|&p| p < index) {
                children[parent].push(index);
            }
        }
        Self {
            nodes,
            children,
            truncated,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the snapshot hit its node limit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Root index (the body), if any.
    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    pub fn node(&self, index: usize) -> Option<&SnapshotNode> {
        self.nodes.get(index)
    }

    pub fn element(&self, index: usize) -> Option<&ElementNode> {
        match self.nodes.get(index) {
            Some(SnapshotNode::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(SnapshotNode::parent)
    }

    /// Siblings before `index`, nearest first.
    pub fn preceding_siblings(&self, index: usize) -> Vec<usize> {
        let Some(parent) = self.parent(index) else {
            return Vec::new();
        };
        self.children(parent)
            .iter()
            .copied()
            .take_while(|&c| c != index)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(index), move |&i| self.parent(i))
    }

    /// `index` and all of its descendants in pre-order.
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children(i).iter().rev());
        }
        out
    }

    pub fn is_descendant_of(&self, index: usize, ancestor: usize) -> bool {
        self.ancestors(index).any(|a| a == ancestor)
    }

    /// Text of the direct text children of `index`.
    pub fn direct_text(&self, index: usize) -> String {
        let parts: Vec<&str> = self
            .children(index)
            .iter()
            .filter_map(|&c| match &self.nodes[c] {
                SnapshotNode::Text { text, .. } => Some(text.as_str()),
                SnapshotNode::Element(_) => None,
            })
            .collect();
        parts.join(" ")
    }

    /// All text under `index`.
    pub fn full_text(&self, index: usize) -> String {
        self.full_text_excluding(index, None)
    }

    /// All text under `index`, skipping the subtree rooted at `exclude`.
    pub fn full_text_excluding(&self, index: usize, exclude: Option<usize>) -> String {
        let mut parts = Vec::new();
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            if Some(i) == exclude {
                continue;
            }
            match &self.nodes[i] {
                SnapshotNode::Text { text, .. } => parts.push(text.as_str()),
                SnapshotNode::Element(_) => stack.extend(self.children(i).iter().rev()),
            }
        }
        parts.join(" ")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for snapshot trees in tests.

    use serde_json::{json, Value};

    /// Accumulates snapshot nodes in the shape the agent script emits.
    #[derive(Default)]
    pub struct SnapshotBuilder {
        nodes: Vec<Value>,
    }

    impl SnapshotBuilder {
        pub fn new() -> Self {
            let mut builder = Self::default();
            builder.nodes.push(json!({"kind": "element", "parent": null, "tag": "body", "attrs": {}}));
            builder
        }

        /// Add an element under `parent` and return its index.
        pub fn element(&mut self, parent: usize, tag: &str, attrs: Value) -> usize {
            self.nodes.push(json!({
                "kind": "element",
                "parent": parent,
                "tag": tag,
                "attrs": attrs,
            }));
            self.nodes.len() - 1
        }

        /// Add an `<input>` with a DOM value.
        pub fn input(&mut self, parent: usize, input_type: &str, attrs: Value, value: &str) -> usize {
            let mut attrs = attrs;
            attrs["type"] = json!(input_type);
            self.nodes.push(json!({
                "kind": "element",
                "parent": parent,
                "tag": "input",
                "attrs": attrs,
                "inputType": input_type,
                "value": value,
                "checked": false,
            }));
            self.nodes.len() - 1
        }

        /// Add a `<select>` with `(value, text)` options, the first selected.
        pub fn select(&mut self, parent: usize, attrs: Value, options: &[(&str, &str)]) -> usize {
            let opts: Vec<Value> = options
                .iter()
                .enumerate()
                .map(|(i, (v, t))| json!({"value": v, "text": t, "selected": i == 0}))
                .collect();
            self.nodes.push(json!({
                "kind": "element",
                "parent": parent,
                "tag": "select",
                "attrs": attrs,
                "value": options.first().map(|o| o.0).unwrap_or(""),
                "options": opts,
            }));
            self.nodes.len() - 1
        }

        pub fn text(&mut self, parent: usize, text: &str) -> usize {
            self.nodes.push(json!({"kind": "text", "parent": parent, "text": text}));
            self.nodes.len() - 1
        }

        /// Hide the element at `index` via computed style.
        pub fn hide(&mut self, index: usize) {
            self.nodes[index]["style"] = json!({"native": false, "display": "none"});
        }

        pub fn build(self) -> Value {
            json!({"nodes": self.nodes, "truncated": false})
        }
    }
}
