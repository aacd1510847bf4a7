//! Tool protocol definitions.
//!
//! Tools are how a controller drives the browser: every page operation is
//! a tool with a JSON-schema'd parameter object.

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;
