//! Extension lifecycle errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(String),

    /// An extension or tool id is taken.
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Extension initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Extension shutdown failed: {0}")]
    ShutdownFailed(String),

    /// A config section handed to the extension did not deserialize.
    #[error("Invalid config section '{key}': {message}")]
    InvalidConfig { key: String, message: String },
}
