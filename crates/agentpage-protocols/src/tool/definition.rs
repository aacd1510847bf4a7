//! Tool definitions as advertised to the controller.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::PageEffect;

/// Id, description and parameter schema of one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    pub description: String,

    /// JSON Schema of the parameter object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_schema: Option<Value>,

    #[serde(default)]
    pub effect: PageEffect,
}

impl ToolDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema: None,
            effect: PageEffect::Observe,
        }
    }

    pub fn with_parameters_schema(mut self, schema: Value) -> Self {
        self.parameters_schema = Some(schema);
        self
    }

    pub fn with_effect(mut self, effect: PageEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Names listed under the schema's `required` key.
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters_schema
            .as_ref()
            .and_then(|s| s.get("required"))
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// The parameter schema, or an empty object schema when none is declared.
    pub fn input_schema(&self) -> Value {
        self.parameters_schema
            .clone()
            .unwrap_or_else(|| json!({"type": "object", "properties": {}}))
    }
}
