//! JSON-lines tool loop.
//!
//! Each input line is `{"tool": "<id>", "params": {...}}`; each output line
//! is the serialized `ToolResult`. Bad lines and tool errors are answered
//! with a failed result so the caller always gets one line back per line in.

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use agentpage_core::Host;
use agentpage_protocols::ToolResult;

const SESSION_ID: &str = "stdio";

#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default = "empty_params")]
    params: Value,
}

fn empty_params() -> Value {
    Value::Object(Default::default())
}

/// Answer tool calls from `input` until EOF.
pub(crate) async fn serve<R, W>(host: &Host, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0usize;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let result = handle_line(host, line).await;
        let mut encoded = serde_json::to_string(&result)?;
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }
    info!("Input closed after {} calls", handled);
    Ok(())
}

async fn handle_line(host: &Host, line: &str) -> ToolResult {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            warn!("Rejected input line: {}", e);
            return ToolResult::error(format!("Invalid request: {}", e));
        }
    };
    debug!("Calling {}", call.tool);
    match host
        .call_tool(&call.tool, call.params, host.tool_context(SESSION_ID))
        .await
    {
        Ok(result) => result,
        Err(e) => {
            warn!("Tool {} failed: {}", call.tool, e);
            ToolResult::from_error(&e)
        }
    }
}
