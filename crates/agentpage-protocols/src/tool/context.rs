//! Per-call tool context.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Span;

/// Context handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Controller session issuing the call.
    pub session_id: String,

    /// Unique id of this call, carried on its tracing span.
    pub call_id: String,

    /// Working directory of the host.
    pub work_dir: PathBuf,

    cancelled: Arc<AtomicBool>,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>, work_dir: PathBuf) -> Self {
        Self {
            session_id: session_id.into(),
            call_id: uuid::Uuid::new_v4().to_string(),
            work_dir,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask the call to stop. Clones share the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Span for everything the call logs.
    pub fn span(&self, tool_id: &str) -> Span {
        tracing::info_span!(
            "tool_call",
            tool = tool_id,
            session = %self.session_id,
            call = %self.call_id
        )
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
