//! Settlement and page-walker tuning.

use serde::{Deserialize, Serialize};

/// Defaults for one settlement attempt. Callers may override per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Quiet period the mutation watcher waits for.
    #[serde(default = "default_dom_idle_ms")]
    pub dom_idle_ms: u64,

    /// Quiet period with no in-flight requests.
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    /// Hard cap on the whole race.
    #[serde(default = "default_global_timeout_ms")]
    pub global_timeout_ms: u64,

    /// How long a seen dialog may take to be accepted.
    #[serde(default = "default_dialog_timeout_ms")]
    pub dialog_timeout_ms: u64,

    /// Sleep after the race before the verdict is assembled.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Mutations on targets matching these selectors are ignored.
    #[serde(default)]
    pub ignored_selectors: Vec<String>,

    /// Attribute mutations on these names are ignored.
    #[serde(default)]
    pub ignored_attributes: Vec<String>,

    /// Loading-indicator selectors. Empty means the built-in list.
    #[serde(default)]
    pub loading_selectors: Vec<String>,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            dom_idle_ms: default_dom_idle_ms(),
            network_idle_ms: default_network_idle_ms(),
            global_timeout_ms: default_global_timeout_ms(),
            dialog_timeout_ms: default_dialog_timeout_ms(),
            grace_ms: default_grace_ms(),
            ignored_selectors: Vec::new(),
            ignored_attributes: Vec::new(),
            loading_selectors: Vec::new(),
        }
    }
}

/// Page walker limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Snapshot stops collecting nodes past this count.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Longest text run kept per node in the outline.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Number of options listed inline for a select.
    #[serde(default = "default_option_preview")]
    pub option_preview: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_text_len: default_max_text_len(),
            option_preview: default_option_preview(),
        }
    }
}

fn default_dom_idle_ms() -> u64 {
    500
}

fn default_network_idle_ms() -> u64 {
    500
}

fn default_global_timeout_ms() -> u64 {
    10_000
}

fn default_dialog_timeout_ms() -> u64 {
    1_000
}

fn default_grace_ms() -> u64 {
    100
}

fn default_max_nodes() -> usize {
    20_000
}

fn default_max_text_len() -> usize {
    200
}

fn default_option_preview() -> usize {
    5
}
