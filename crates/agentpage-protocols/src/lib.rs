//! # agentpage protocols
//!
//! Trait and type definitions shared by the agentpage crates. Nothing in
//! here talks to a browser; it only describes how tools are declared,
//! invoked and grouped into extensions.
//!
//! - [`Tool`] - an invocable unit exposed to the controller
//! - [`Extension`] - a bundle of tools with a lifecycle

pub mod error;
pub mod extension;
pub mod tool;
pub mod types;

pub use error::{ExtensionError, ToolError};
pub use extension::{Extension, ExtensionContext, ExtensionManifest, ToolRegistryAccess};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolResult};
pub use types::*;
