//! Extension protocol definitions.
//!
//! An extension owns some long-lived resource (a browser, say) and registers
//! the tools that operate on it.

mod context;
mod manifest;
mod traits;

pub use context::*;
pub use manifest::*;
pub use traits::*;
