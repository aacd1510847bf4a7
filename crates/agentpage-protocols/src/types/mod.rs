//! Common types shared across crates.

mod common;

pub use common::*;
