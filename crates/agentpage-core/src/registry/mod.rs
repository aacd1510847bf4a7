//! Registries for extensions and tools.

mod base;
mod extension;
mod tool;

pub use base::{BaseRegistry, Registerable};
pub use extension::ExtensionRegistry;
pub use tool::ToolRegistry;
