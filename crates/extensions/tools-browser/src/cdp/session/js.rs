//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::EvaluateResponse;

use super::core::PageSession;

/// `(function)(arg0, arg1, ...)` with every argument inlined as JSON.
pub(crate) fn build_call_expression(function: &str, args: &[Value]) -> Result<String, CdpError> {
    let rendered = args
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})({})", function.trim(), rendered.join(", ")))
}

impl PageSession {
    /// Evaluate a JavaScript expression, awaiting promises, and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                    "userGesture": true,
                })),
            )
            .await?;

        let response: EvaluateResponse = serde_json::from_value(result)?;
        if let Some(exception) = response.exception_details {
            return Err(CdpError::Script(exception.message()));
        }
        Ok(response.result.value)
    }

    /// Call a function expression with JSON arguments.
    pub async fn call_function(&self, function: &str, args: &[Value]) -> Result<Value, CdpError> {
        let expression = build_call_expression(function, args)?;
        self.evaluate(&expression).await
    }
}
