//! # agentpage core
//!
//! Hosts extensions and the tools they register.
//!
//! - [`Host`] - loads extensions, routes tool calls, shuts everything down
//! - [`ToolRegistry`] / [`ExtensionRegistry`] - id-keyed registries

pub mod host;
pub mod registry;

pub use host::Host;
pub use registry::{ExtensionRegistry, ToolRegistry};
