//! The in-page agent script and typed calls into it.
//!
//! The script installs `window.__AGENT_PAGE__` once per document. Every
//! call goes through [`invoke`], which reinstalls the script when a
//! navigation has wiped it and retries once.

use serde_json::{json, Value};
use tracing::debug;

use crate::driver::{DriverError, PageDriver};

/// Source of the install function.
pub const INSTALL_SCRIPT: &str = include_str!("agent_page.js");

/// Must match `VERSION` in `agent_page.js`.
pub const SCRIPT_VERSION: u32 = 1;

/// Calls `window.__AGENT_PAGE__[method](...args)` if the current version is installed.
pub const INVOKE_FN: &str = r#"function(method, args, version) {
  const api = window.__AGENT_PAGE__;
  if (!api || api.version !== version) {
    return { __agentPageMissing: true };
  }
  return api[method].apply(api, args);
}"#;

/// Selectors treated as loading indicators when none are configured.
pub const DEFAULT_LOADING_SELECTORS: &[&str] = &[
    "[aria-busy=\"true\"]",
    ".loading",
    ".spinner",
    ".loader",
    "[role=\"progressbar\"]",
    ".skeleton",
    "[data-loading=\"true\"]",
];

fn is_missing(value: &Value) -> bool {
    value.get("__agentPageMissing").and_then(Value::as_bool) == Some(true)
}

/// Make sure the agent script is installed in the current document.
pub async fn install(driver: &dyn PageDriver) -> Result<(), DriverError> {
    driver.evaluate(INSTALL_SCRIPT, Vec::new()).await?;
    Ok(())
}

/// Call `method` on the agent script with `args`.
pub async fn invoke(
    driver: &dyn PageDriver,
    method: &str,
    args: Vec<Value>,
) -> Result<Value, DriverError> {
    let call_args = vec![json!(method), Value::Array(args), json!(SCRIPT_VERSION)];
    let result = driver.evaluate(INVOKE_FN, call_args.clone()).await?;
    if !is_missing(&result) {
        return Ok(result);
    }

    debug!("Agent script missing, installing before {}", method);
    install(driver).await?;
    let result = driver.evaluate(INVOKE_FN, call_args).await?;
    if is_missing(&result) {
        return Err(DriverError::Script(
            "Agent script could not be installed".to_string(),
        ));
    }
    Ok(result)
}
