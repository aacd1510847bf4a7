//! CDP error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Nothing answered on the debugging endpoint.
    #[error("Chrome not reachable at {endpoint}: {reason}. Start it with --remote-debugging-port")]
    Unreachable { endpoint: String, reason: String },

    /// WebSocket or HTTP failure after the endpoint was found.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("Malformed CDP payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected CDP reply: missing {0}")]
    MissingField(&'static str),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Exception thrown by evaluated page code.
    #[error("Page script threw: {0}")]
    Script(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// The socket is gone or the reply channel was dropped.
    #[error("CDP connection closed")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::Transport(format!("WebSocket: {}", e))
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Transport(format!("HTTP: {}", e))
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::Unreachable {
            endpoint: String::new(),
            reason: format!("invalid endpoint URL: {}", e),
        }
    }
}
