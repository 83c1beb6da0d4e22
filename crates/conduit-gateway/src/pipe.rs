//! Single-client transport: newline-delimited JSON-RPC over a byte stream
//!
//! Strictly synchronous. Each response is written and flushed before the next
//! line is read, and carries the id of the request it answers.

use conduit_protocol::{error_codes, JsonRpcResponse};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::handler::McpHandler;

/// Serve requests from `reader` until EOF.
pub async fn serve_pipe<R, W>(handler: &McpHandler, reader: R, mut writer: W) -> Result<(), GatewayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        if reader.read_until(b'\n', &mut frame).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&frame) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handler.handle_message(line.trim()).await,
            Err(e) => {
                warn!(error = %e, "frame is not valid UTF-8");
                Some(JsonRpcResponse::failure(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };
        let Some(response) = response else {
            continue;
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        debug!(id = %response.id, "response written");
    }

    info!("input closed, pipe transport stopping");
    Ok(())
}

/// Serve the process's stdin and stdout.
pub async fn serve_stdio(handler: &McpHandler) -> Result<(), GatewayError> {
    info!("serving MCP over stdio");
    serve_pipe(handler, tokio::io::stdin(), tokio::io::stdout()).await
}
