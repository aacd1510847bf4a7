//! Per-call settlement options.

use std::time::Duration;

use agentpage_config::SettleConfig;
use serde_json::{json, Value};

use crate::script::DEFAULT_LOADING_SELECTORS;

/// Configuration for one settlement attempt. Built from [`SettleConfig`]
/// and then narrowed per call.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleOptions {
    /// Quiet period the mutation watcher needs.
    pub dom_idle: Duration,
    /// Quiet period network-idle detection needs.
    pub network_idle: Duration,
    /// Upper bound for the whole attempt, action included unless
    /// `action_timeout` is set.
    pub global_timeout: Duration,
    /// Separate budget for the action. When set, `global_timeout` counts
    /// from the moment the action returns.
    pub action_timeout: Option<Duration>,
    /// How long to wait for a dialog the interceptor already saw.
    pub dialog_timeout: Duration,
    /// Final stabilization sleep.
    pub grace: Duration,
    pub wait_for_selector: Option<String>,
    /// JS expression that must become truthy.
    pub wait_for_function: Option<String>,
    pub wait_for_text: Option<String>,
    pub ignored_selectors: Vec<String>,
    pub ignored_attributes: Vec<String>,
    pub loading_selectors: Vec<String>,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self::from(&SettleConfig::default())
    }
}

impl From<&SettleConfig> for SettleOptions {
    fn from(config: &SettleConfig) -> Self {
        let loading_selectors = if config.loading_selectors.is_empty() {
            DEFAULT_LOADING_SELECTORS.iter().map(|s| s.to_string()).collect()
        } else {
            config.loading_selectors.clone()
        };
        Self {
            dom_idle: Duration::from_millis(config.dom_idle_ms),
            network_idle: Duration::from_millis(config.network_idle_ms),
            global_timeout: Duration::from_millis(config.global_timeout_ms),
            action_timeout: None,
            dialog_timeout: Duration::from_millis(config.dialog_timeout_ms),
            grace: Duration::from_millis(config.grace_ms),
            wait_for_selector: None,
            wait_for_function: None,
            wait_for_text: None,
            ignored_selectors: config.ignored_selectors.clone(),
            ignored_attributes: config.ignored_attributes.clone(),
            loading_selectors,
        }
    }
}

impl SettleOptions {
    pub fn with_global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = timeout;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = Some(timeout);
        self
    }

    pub fn with_dom_idle(mut self, idle: Duration) -> Self {
        self.dom_idle = idle;
        self
    }

    pub fn with_network_idle(mut self, idle: Duration) -> Self {
        self.network_idle = idle;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.wait_for_selector = Some(selector.into());
        self
    }

    pub fn with_function(mut self, predicate: impl Into<String>) -> Self {
        self.wait_for_function = Some(predicate.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.wait_for_text = Some(text.into());
        self
    }

    /// Whether the caller asked for an explicit condition.
    pub fn has_condition(&self) -> bool {
        self.wait_for_selector.is_some()
            || self.wait_for_function.is_some()
            || self.wait_for_text.is_some()
    }

    /// Argument for the page-side `watch()`.
    pub(crate) fn watch_config(&self) -> Value {
        json!({
            "idleMs": self.dom_idle.as_millis() as u64,
            "ignoredSelectors": self.ignored_selectors,
            "ignoredAttributes": self.ignored_attributes,
        })
    }
}
