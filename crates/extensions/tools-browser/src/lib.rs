//! Settlement-aware semantic page mapping for browser-driving agents.
//!
//! Drives Chrome over the DevTools Protocol and gives a controller two
//! things it cannot get from raw CDP:
//!
//! - **Page settlement**: after an action, wait until DOM mutations,
//!   network traffic, loading indicators and dialogs have calmed down, and
//!   report what changed.
//! - **Semantic element mapping**: walk the visible render tree, classify
//!   interactive elements, give each a readable ID (`email`,
//!   `submit-sign-in`) tagged onto the live DOM, and render the page as a
//!   markdown outline. Actions then target those IDs.
//!
//! ## Architecture
//!
//! ```text
//! tools ──► BrowserManager ──► AgentPage ──► settle / page walker / dispatch
//!                                  │
//!                                  ▼
//!                             PageDriver ◄── PageSession (CDP over WebSocket)
//!                                  │
//!                                  ▼
//!                       window.__AGENT_PAGE__ (in-page script)
//! ```
//!
//! ## Lazy Initialization
//!
//! Chrome is neither launched nor connected when the extension loads. The
//! first `browser_open` does it, reusing a browser already listening on
//! the debug port.
//!
//! ## Tools
//!
//! - `browser_open` / `browser_close` / `browser_list_pages`
//! - `browser_navigate`: navigate, settle, map
//! - `browser_execute_action`: act on an element ID, settle, remap
//! - `browser_discover_actions`: list interactive elements
//! - `browser_generate_page`: the page outline (cached)
//! - `browser_remap_page`: fresh IDs, optionally after a selector appears
//! - `browser_wait_for_changes`: settle without acting, then remap

pub mod agent;
pub mod cdp;
pub mod dispatch;
pub mod driver;
mod extension;
pub mod manager;
pub mod page;
pub mod script;
pub mod settle;
mod tools;

#[cfg(test)]
mod testing;

pub use agent::{ActionUpdate, AgentError, AgentPage, NavigationUpdate, PageUpdate};
pub use cdp::{CdpClient, CdpError, PageSession};
pub use dispatch::{ActionParams, DispatchError, DispatchOutcome};
pub use driver::{DialogEvent, DialogKind, DriverError, PageDriver};
pub use extension::{BrowserToolsExtension, TOOL_IDS};
pub use manager::{find_chrome, BrowserError, BrowserManager, BrowserManagerConfig, PageListing, CHROME_PATH_ENV};
pub use page::{InteractiveElement, Manifest, ManifestDiff};
pub use settle::{settle, SettleChanges, SettleOptions, SettleResult};
pub use tools::*;
