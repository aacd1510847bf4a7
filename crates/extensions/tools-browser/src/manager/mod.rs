//! Browser instance manager.
//!
//! Launches Chrome with a persistent profile when nothing listens on the
//! debug port, connects over CDP and keeps one [`AgentPage`](crate::AgentPage)
//! per open tab.

mod launch;
mod manager_core;
mod manager_pages;
mod manager_types;

pub use launch::{find_chrome, CHROME_PATH_ENV};
pub use manager_core::BrowserManager;
pub use manager_pages::PageListing;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
