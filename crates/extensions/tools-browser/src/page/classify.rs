//! Element classifier: interactive or not, and how to act on it.

use serde::{Deserialize, Serialize};

use super::snapshot::ElementNode;

/// Broad element family reported to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Input,
    Textarea,
    Select,
    Button,
    Link,
    Custom,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Input => "input",
            TagKind::Textarea => "textarea",
            TagKind::Select => "select",
            TagKind::Button => "button",
            TagKind::Link => "link",
            TagKind::Custom => "custom",
        }
    }
}

/// What dispatching against an element does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fill,
    Toggle,
    Select,
    Click,
    Adjust,
    Upload,
    Edit,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fill => "fill",
            ActionKind::Toggle => "toggle",
            ActionKind::Select => "select",
            ActionKind::Click => "click",
            ActionKind::Adjust => "adjust",
            ActionKind::Upload => "upload",
            ActionKind::Edit => "edit",
        }
    }

    /// Parse the `data-mcp-action` value. Unknown values dispatch as clicks.
    pub fn parse(value: &str) -> Self {
        match value {
            "fill" => ActionKind::Fill,
            "toggle" => ActionKind::Toggle,
            "select" => ActionKind::Select,
            "adjust" => ActionKind::Adjust,
            "upload" => ActionKind::Upload,
            "edit" => ActionKind::Edit,
            _ => ActionKind::Click,
        }
    }

    /// Whether dispatch needs a `value` parameter.
    pub fn takes_value(&self) -> bool {
        match self {
            ActionKind::Fill | ActionKind::Select | ActionKind::Adjust | ActionKind::Edit => true,
            ActionKind::Toggle | ActionKind::Click | ActionKind::Upload => false,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub tag_kind: TagKind,
    pub action_kind: ActionKind,
}

const TEXT_LIKE: &[&str] = &["text", "email", "password", "tel", "url", "search", "number"];
const DATE_TIME: &[&str] = &["date", "time", "datetime-local", "month", "week"];

/// Classify a visible element. `None` means not interactive.
pub fn classify(el: &ElementNode) -> Option<Classification> {
    let tag = el.tag.as_str();
    let classification = match tag {
        "input" => {
            let input_type = el.input_type().unwrap_or_else(|| "text".to_string());
            if input_type == "hidden" {
                return None;
            }
            Classification {
                tag_kind: TagKind::Input,
                action_kind: input_action(&input_type),
            }
        }
        "textarea" => Classification {
            tag_kind: TagKind::Textarea,
            action_kind: ActionKind::Fill,
        },
        "select" => Classification {
            tag_kind: TagKind::Select,
            action_kind: ActionKind::Select,
        },
        "button" => Classification {
            tag_kind: TagKind::Button,
            action_kind: ActionKind::Click,
        },
        "a" if el.has_attr("href") => Classification {
            tag_kind: TagKind::Link,
            action_kind: ActionKind::Click,
        },
        _ if is_content_editable(el) => Classification {
            tag_kind: TagKind::Custom,
            action_kind: ActionKind::Edit,
        },
        _ if el.has_attr("onclick")
            || matches!(el.attr("role"), Some("button" | "link"))
            || tag == "summary" =>
        {
            Classification {
                tag_kind: TagKind::Custom,
                action_kind: ActionKind::Click,
            }
        }
        _ => return None,
    };
    Some(classification)
}

fn input_action(input_type: &str) -> ActionKind {
    match input_type {
        t if TEXT_LIKE.contains(&t) || DATE_TIME.contains(&t) => ActionKind::Fill,
        "checkbox" | "radio" => ActionKind::Toggle,
        "range" | "color" => ActionKind::Adjust,
        "file" => ActionKind::Upload,
        _ => ActionKind::Click,
    }
}

fn is_content_editable(el: &ElementNode) -> bool {
    match el.attr("contenteditable") {
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
        None => false,
    }
}

/// Buttons that submit their form.
pub fn is_submit_like(el: &ElementNode) -> bool {
    match el.tag.as_str() {
        "button" => match el.attr("type") {
            None => true,
            Some(t) => t.trim().eq_ignore_ascii_case("submit"),
        },
        "input" => el.input_type().as_deref() == Some("submit"),
        _ => false,
    }
}

/// Whether an element is a form control that can carry a label.
pub fn is_labelable(el: &ElementNode) -> bool {
    matches!(el.tag.as_str(), "input" | "textarea" | "select")
}
