//! Navigation, waits and dialog handling for CDP page session.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::driver::NAVIGATION_TIMEOUT;

use super::core::PageSession;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Navigate to URL and wait for the document to load.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::Navigation(error.to_string()));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();
        self.wait_for_load(NAVIGATION_TIMEOUT).await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Wait until `document.readyState` is interactive or complete.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();
        loop {
            // The context is replaced mid-navigation; script errors mean "not yet".
            match self.evaluate("document.readyState").await {
                Ok(state) if matches!(state.as_str(), Some("complete" | "interactive")) => {
                    return Ok(());
                }
                Ok(_) | Err(CdpError::Script(_)) | Err(CdpError::Protocol { .. }) => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    pub async fn get_title(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.title").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Poll until `selector` matches an element.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), CdpError> {
        let expression = format!(
            "!!document.querySelector({})",
            serde_json::to_string(selector)?
        );
        self.poll_truthy(&expression, timeout)
            .await
            .map_err(|e| match e {
                CdpError::Timeout(_) => CdpError::Timeout(format!(
                    "Waiting for selector '{}' timed out",
                    selector
                )),
                other => other,
            })
    }

    /// Poll until the JS expression `predicate` is truthy.
    pub async fn wait_for_function(&self, predicate: &str, timeout: Duration) -> Result<(), CdpError> {
        let expression = format!("!!(function() {{ return ({}); }})()", predicate);
        self.poll_truthy(&expression, timeout).await
    }

    async fn poll_truthy(&self, expression: &str, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();
        loop {
            match self.evaluate(expression).await {
                Ok(v) if v.as_bool() == Some(true) => return Ok(()),
                Ok(_) | Err(CdpError::Script(_)) => {}
                Err(e) => return Err(e),
            }
            if start.elapsed() >= timeout {
                return Err(CdpError::Timeout(format!("Waiting for {} timed out", expression)));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Accept the currently open JavaScript dialog.
    pub async fn accept_dialog(&self, prompt_text: Option<&str>) -> Result<(), CdpError> {
        let mut params = json!({"accept": true});
        if let Some(text) = prompt_text {
            params["promptText"] = json!(text);
        }
        self.call("Page.handleJavaScriptDialog", Some(params)).await?;
        Ok(())
    }
}
