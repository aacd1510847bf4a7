//! CDP page session for interacting with a single page.

mod core;
mod events;
mod js;
mod navigation;
mod network;
mod page_driver;

pub use self::core::PageSession;
