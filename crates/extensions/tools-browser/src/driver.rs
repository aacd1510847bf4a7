//! The outbound seam between page logic and the browser.
//!
//! Everything above this trait (walker, dispatch, settlement, the
//! controller API) talks to a page only through [`PageDriver`]. The CDP
//! [`PageSession`](crate::cdp::PageSession) is the production
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::cdp::CdpError;

/// Upper bound for [`PageDriver::navigate`], load wait included.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by a page driver.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Page code threw.
    #[error("Script error: {0}")]
    Script(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The page or its connection is gone.
    #[error("Page closed")]
    Closed,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Script(msg) => DriverError::Script(msg),
            CdpError::Timeout(msg) => DriverError::Timeout(msg),
            CdpError::Navigation(msg) => DriverError::Navigation(msg),
            CdpError::Closed => DriverError::Closed,
            other => DriverError::Transport(other.to_string()),
        }
    }
}

/// Kind of a JavaScript dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    BeforeUnload,
}

impl DialogKind {
    /// Parse the CDP `type` string. Unknown kinds are treated as alerts.
    pub fn from_cdp(kind: &str) -> Self {
        match kind {
            "confirm" => DialogKind::Confirm,
            "prompt" => DialogKind::Prompt,
            "beforeunload" => DialogKind::BeforeUnload,
            _ => DialogKind::Alert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogKind::Alert => "alert",
            DialogKind::Confirm => "confirm",
            DialogKind::Prompt => "prompt",
            DialogKind::BeforeUnload => "beforeunload",
        }
    }
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dialog the page opened.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogEvent {
    pub kind: DialogKind,
    pub message: String,
    pub default_prompt: Option<String>,
}

/// Browser operations the page logic needs.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Call `function` (a JS function expression) with JSON `args` in the
    /// page and return its JSON result. Promises are awaited.
    async fn evaluate(&self, function: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    async fn url(&self) -> Result<String, DriverError>;

    async fn title(&self) -> Result<String, DriverError>;

    /// Navigate and wait for the document to become interactive.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Resolve once no request has been in flight for `idle`.
    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration)
    -> Result<(), DriverError>;

    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
    -> Result<(), DriverError>;

    /// Resolve once the JS expression `predicate` is truthy.
    async fn wait_for_function(&self, predicate: &str, timeout: Duration)
    -> Result<(), DriverError>;

    /// Dialogs opened from now on.
    fn subscribe_dialogs(&self) -> broadcast::Receiver<DialogEvent>;

    /// Accept the open dialog, answering prompts with `prompt_text`.
    async fn accept_dialog(&self, prompt_text: Option<&str>) -> Result<(), DriverError>;

    /// Total requests started since the page was attached.
    fn network_request_count(&self) -> u64;
}
