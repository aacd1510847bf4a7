//! Browser manager errors and configuration.

use std::path::PathBuf;
use std::time::Duration;

use agentpage_config::{Config, SettleConfig, WalkerConfig};
use thiserror::Error;

use crate::agent::AgentError;
use crate::cdp::CdpError;

/// Browser manager errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error(transparent)]
    Page(#[from] AgentError),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Unreachable { .. } | CdpError::Transport(_) => {
                BrowserError::ConnectionFailed(e.to_string())
            }
            CdpError::Closed => BrowserError::NotConnected,
            other => BrowserError::Cdp(other.to_string()),
        }
    }
}

/// Browser manager configuration.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    pub headless: bool,
    /// Upper bound on one CDP round-trip.
    pub command_timeout: Duration,
    /// Settlement defaults for every page.
    pub settle: SettleConfig,
    pub walker: WalkerConfig,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for BrowserManagerConfig {
    fn from(config: &Config) -> Self {
        let browser = &config.browser;
        Self {
            debug_port: browser.debug_port,
            viewport_width: browser.viewport_width,
            viewport_height: browser.viewport_height,
            profile_dir: browser.profile_dir.clone(),
            headless: browser.headless,
            command_timeout: Duration::from_millis(browser.command_timeout_ms),
            settle: config.settle.clone(),
            walker: config.walker.clone(),
        }
    }
}

impl BrowserManagerConfig {
    /// Get the profile directory, falling back to `~/.agentpage/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        agentpage_config::BrowserConfig {
            profile_dir: self.profile_dir.clone(),
            ..Default::default()
        }
        .resolved_profile_dir()
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
