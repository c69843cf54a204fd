use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::errors::{WhippyError, WhippyResult};
use crate::mcp::server::McpServer;

/// Serves newline-delimited JSON-RPC on the process's stdin/stdout.
pub async fn serve_stdio(server: Arc<McpServer>) -> WhippyResult<()> {
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Reads one message per line. Each message is handled on its own task; replies are funnelled
/// through a channel to a single writer so lines never interleave. Returns once the reader hits
/// EOF and every in-flight reply has been written.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, mut writer: W) -> WhippyResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<serde_json::Value>(32);

    let writer_task = tokio::spawn(async move {
        while let Some(reply) = rx.recv().await {
            let mut line = serde_json::to_string(&reply)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<(), WhippyError>(())
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(reply) = server.handle_line(&line).await {
                if tx.send(reply).await.is_err() {
                    tracing::warn!("stdout writer closed; dropping reply");
                }
            }
        });
    }
    tracing::info!("stdin closed, shutting down");

    drop(tx);
    writer_task
        .await
        .map_err(|e| WhippyError::Io(std::io::Error::other(e)))??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ApiResult;
    use crate::router::dispatcher::tests::{dispatcher, MockExecutor};
    use serde_json::{json, Value};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn replies_to_every_request_line() {
        let mock = MockExecutor::replying(ApiResult::Success(json!({ "data": [] })));
        let server = Arc::new(McpServer::new(dispatcher(mock.clone())));

        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"whippy_api","arguments":{"resource":"contacts","action":"list","params":{"limit":250}}}}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        ]
        .join("\n");

        let (writer, mut reader) = tokio::io::duplex(1 << 16);
        serve(server, input.as_bytes(), writer).await.unwrap();

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        let mut ids: Vec<i64> = output
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_i64().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);

        assert_eq!(mock.calls()[0].query, Some(json!({ "limit": 100 })));
    }
}
