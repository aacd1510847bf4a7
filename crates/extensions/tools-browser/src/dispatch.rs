//! Dispatch table: perform an action on a tagged element.
//!
//! The lookup and the action switch run inside the page
//! (`__AGENT_PAGE__.execute`); this side validates parameters and turns
//! the page's reply into typed outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::driver::{DriverError, PageDriver};
use crate::page::ActionKind;
use crate::script;

/// Dispatch failures. Each carries the offending element id.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Element not found: {id}")]
    ElementNotFound { id: String },

    #[error("No option matching '{value}' in {id}. Available: {}", .available.join(", "))]
    OptionNotFound {
        id: String,
        value: String,
        available: Vec<String>,
    },

    #[error("Unsupported operation '{action}' on {id}")]
    UnsupportedOperation { id: String, action: String },

    #[error("Invalid parameters for {id}: {message}")]
    InvalidParams { id: String, message: String },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl DispatchError {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ElementNotFound { .. } => "ElementNotFound",
            DispatchError::OptionNotFound { .. } => "OptionNotFound",
            DispatchError::UnsupportedOperation { .. } => "UnsupportedOperation",
            DispatchError::InvalidParams { .. } => "InvalidParams",
            DispatchError::Driver(_) => "DriverError",
        }
    }
}

/// Parameters of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Text for fill/select/adjust/edit, or a bool to force a toggle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ActionParams {
    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// What the page reported after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub id: String,
    pub action: ActionKind,
    /// Value after the action, where the action has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl DispatchOutcome {
    pub fn summary(&self) -> String {
        let value = self.value.as_ref().map(render_value);
        match (self.action, value) {
            (ActionKind::Fill, Some(v)) => format!("Filled {} with {}", self.id, v),
            (ActionKind::Adjust, Some(v)) => format!("Set {} to {}", self.id, v),
            (ActionKind::Select, Some(v)) => format!("Selected {} in {}", v, self.id),
            (ActionKind::Toggle, Some(v)) => format!("Toggled {} (checked: {})", self.id, v),
            (ActionKind::Edit, Some(_)) => format!("Edited {}", self.id),
            (ActionKind::Click, _) => format!("Clicked {}", self.id),
            (ActionKind::Upload, _) => format!("Upload on {}", self.id),
            (action, None) => format!("Performed {} on {}", action, self.id),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct PageReply {
    ok: bool,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    options: Vec<String>,
}

/// Run the action tagged on element `id`.
pub async fn dispatch(
    driver: &dyn PageDriver,
    id: &str,
    params: &ActionParams,
) -> Result<DispatchOutcome, DispatchError> {
    let raw = script::invoke(driver, "execute", vec![json!(id), json!(params)]).await?;
    let reply: PageReply = serde_json::from_value(raw).map_err(|e| {
        DispatchError::Driver(DriverError::Script(format!("Malformed execute reply: {}", e)))
    })?;
    debug!("Dispatch {} -> ok={} action={:?}", id, reply.ok, reply.action);

    if reply.ok {
        return Ok(DispatchOutcome {
            id: id.to_string(),
            action: ActionKind::parse(reply.action.as_deref().unwrap_or("click")),
            value: reply.value,
        });
    }

    let message = reply.message.unwrap_or_default();
    let err = match reply.error.as_deref() {
        Some("ElementNotFound") => DispatchError::ElementNotFound { id: id.to_string() },
        Some("OptionNotFound") => DispatchError::OptionNotFound {
            id: id.to_string(),
            value: params.value.as_ref().map(value_text).unwrap_or_default(),
            available: reply.options,
        },
        Some("UnsupportedOperation") => DispatchError::UnsupportedOperation {
            id: id.to_string(),
            action: reply.action.unwrap_or_else(|| "upload".to_string()),
        },
        Some("InvalidParams") => DispatchError::InvalidParams {
            id: id.to_string(),
            message,
        },
        other => DispatchError::Driver(DriverError::Script(format!(
            "{}: {}",
            other.unwrap_or("UnknownError"),
            message
        ))),
    };
    Err(err)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;

    #[tokio::test]
    async fn test_missing_element_names_the_id() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |_| {
            Ok(json!({"ok": false, "error": "ElementNotFound", "message": "gone"}))
        });

        let err = dispatch(&driver, "missing-id", &ActionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(&err, DispatchError::ElementNotFound { id } if id == "missing-id"));
        assert!(err.to_string().contains("missing-id"));
        assert_eq!(err.kind(), "ElementNotFound");
    }

    #[tokio::test]
    async fn test_params_passed_to_page() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |args| {
            Ok(json!({"ok": true, "action": "select", "value": args[1]["value"]}))
        });

        let outcome = dispatch(&driver, "country", &ActionParams::with_value("United States"))
            .await
            .unwrap();
        assert_eq!(outcome.action, ActionKind::Select);
        assert_eq!(outcome.value, Some(json!("United States")));
        assert_eq!(outcome.summary(), "Selected \"United States\" in country");

        let calls = driver.invocations("execute");
        assert_eq!(calls[0][0], json!("country"));
        assert_eq!(calls[0][1], json!({"value": "United States"}));
    }

    #[tokio::test]
    async fn test_option_not_found_lists_options() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |_| {
            Ok(json!({
                "ok": false,
                "error": "OptionNotFound",
                "message": "No option",
                "options": ["Canada", "Mexico"]
            }))
        });

        let err = dispatch(&driver, "country", &ActionParams::with_value("Narnia"))
            .await
            .unwrap_err();
        match &err {
            DispatchError::OptionNotFound { id, value, available } => {
                assert_eq!(id, "country");
                assert_eq!(value, "Narnia");
                assert_eq!(available, &vec!["Canada".to_string(), "Mexico".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("Canada, Mexico"));
    }

    #[tokio::test]
    async fn test_upload_unsupported() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |_| {
            Ok(json!({"ok": false, "error": "UnsupportedOperation", "message": "no"}))
        });
        let err = dispatch(&driver, "avatar", &ActionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnsupportedOperation { ref id, ref action } if id == "avatar" && action == "upload"
        ));
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |_| {
            Ok(json!({"ok": false, "error": "InvalidParams", "message": "fill requires a value"}))
        });
        let err = dispatch(&driver, "email", &ActionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidParams { ref message, .. } if message == "fill requires a value"
        ));
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let driver = FakeDriver::new();
        driver.on_invoke("execute", |_| Ok(json!("nonsense")));
        let err = dispatch(&driver, "x", &ActionParams::default()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Driver(DriverError::Script(_))));
    }

    #[test]
    fn test_outcome_summaries() {
        let outcome = |action, value: Option<Value>| DispatchOutcome {
            id: "el".into(),
            action,
            value,
        };
        assert_eq!(outcome(ActionKind::Click, None).summary(), "Clicked el");
        assert_eq!(
            outcome(ActionKind::Fill, Some(json!("hi"))).summary(),
            "Filled el with \"hi\""
        );
        assert_eq!(
            outcome(ActionKind::Toggle, Some(json!(true))).summary(),
            "Toggled el (checked: true)"
        );
        assert_eq!(outcome(ActionKind::Fill, None).summary(), "Performed fill on el");
    }
}
