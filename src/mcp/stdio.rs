//! JSON-RPC over stdin/stdout, one message per line.

use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::dispatch::McpHandler;
use crate::error::PriceAlertError;

pub async fn run(handler: McpHandler) -> Result<(), PriceAlertError> {
    info!("JSON-RPC stdio transport ready");
    serve_lines(
        &handler,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    info!("stdin closed, shutting down");
    Ok(())
}

/// Answers each non-blank line in order until the reader is exhausted.
/// Lines that are not UTF-8 are decoded lossily and answered with a parse
/// error instead of ending the loop.
pub async fn serve_lines<R, W>(
    handler: &McpHandler,
    mut reader: R,
    mut writer: W,
) -> Result<(), PriceAlertError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }

        let response = handler.handle_message(line.trim_end_matches(['\r', '\n'])).await;
        let mut frame = serde_json::to_vec(&response)?;
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }
    Ok(())
}
