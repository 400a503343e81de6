//! Stdio transport for the MCP service.
//!
//! Inbound lines pass through the gate before the service sees them. The
//! service's responses and the gate's rejections share one writer, one
//! JSON message per line.

use rmcp::ServiceExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{EcsPlanError, Result};

use super::gate::{Screened, screen_line};
use super::handler::ToolServer;

const PIPE_CAPACITY: usize = 64 * 1024;
const OUTBOX_CAPACITY: usize = 64;

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Lines passed on to the MCP service.
    pub forwarded: usize,
    /// Lines answered with an error by the gate.
    pub rejected: usize,
}

#[derive(Debug, Default)]
struct Counters {
    forwarded: AtomicUsize,
    rejected: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> ServeStats {
        ServeStats {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Runs one MCP session reading from `reader` and writing to `writer`.
///
/// The session starts with the `initialize` handshake and ends when the
/// input closes.
///
/// # Errors
///
/// Returns an error if the handshake fails or reading the input fails.
pub async fn serve<R, W>(server: ToolServer, reader: R, writer: W) -> Result<ServeStats>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (service_io, gate_io) = tokio::io::duplex(PIPE_CAPACITY);
    let (gate_read, gate_write) = tokio::io::split(gate_io);
    let (outbox, inbox) = mpsc::channel(OUTBOX_CAPACITY);
    let counters = Arc::new(Counters::default());

    let writer_task = tokio::spawn(write_lines(inbox, writer));
    let relay_task = tokio::spawn(relay_lines(gate_read, outbox.clone()));
    let gate_task = tokio::spawn(screen_input(
        reader,
        gate_write,
        outbox,
        Arc::clone(&counters),
    ));

    let service = match server.serve(tokio::io::split(service_io)).await {
        Ok(service) => service,
        Err(e) => {
            gate_task.abort();
            relay_task.abort();
            writer_task.abort();
            return Err(EcsPlanError::server(e.to_string()));
        }
    };

    let reason = service
        .waiting()
        .await
        .map_err(|e| EcsPlanError::server(e.to_string()))?;
    debug!("MCP session ended: {reason:?}");

    // Normally finished already; the session can also end while the gate
    // still waits for input.
    gate_task.abort();
    match gate_task.await {
        Ok(result) => result?,
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(EcsPlanError::internal(e.to_string())),
    }

    relay_task
        .await
        .map_err(|e| EcsPlanError::internal(e.to_string()))??;
    writer_task
        .await
        .map_err(|e| EcsPlanError::internal(e.to_string()))?;

    Ok(counters.snapshot())
}

/// Runs one MCP session on the process's stdin and stdout.
///
/// # Errors
///
/// Returns an error if the handshake fails or stdin cannot be read.
pub async fn serve_stdio(server: ToolServer) -> Result<ServeStats> {
    info!("Serving {} tools on stdio", server.registry().len());
    let stats = serve(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!(
        "Input closed after {} messages ({} rejected)",
        stats.forwarded + stats.rejected,
        stats.rejected
    );
    Ok(stats)
}

async fn screen_input<R, W>(
    reader: R,
    mut service: W,
    outbox: mpsc::Sender<String>,
    counters: Arc<Counters>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        match screen_line(&line) {
            Screened::Forward(message) => {
                if let Err(e) = forward(&mut service, &message).await {
                    debug!("MCP service stopped reading: {e}");
                    break;
                }
                counters.forwarded.fetch_add(1, Ordering::Relaxed);
            }
            Screened::Reject(response) => {
                warn!("Rejected message: {}", response["error"]["message"]);
                counters.rejected.fetch_add(1, Ordering::Relaxed);
                if outbox.send(response.to_string()).await.is_err() {
                    break;
                }
            }
            Screened::Skip => {}
        }
    }

    // The service sees end of input only once its side is shut down.
    if let Err(e) = service.shutdown().await {
        debug!("Closing MCP service input failed: {e}");
    }
    Ok(())
}

async fn forward<W: AsyncWrite + Unpin>(service: &mut W, message: &str) -> std::io::Result<()> {
    service.write_all(message.as_bytes()).await?;
    service.write_all(b"\n").await?;
    service.flush().await
}

async fn relay_lines<R>(reader: R, outbox: mpsc::Sender<String>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if outbox.send(line).await.is_err() {
            break;
        }
    }
    Ok(())
}

async fn write_lines<W: AsyncWrite + Unpin>(mut inbox: mpsc::Receiver<String>, mut writer: W) {
    while let Some(line) = inbox.recv().await {
        if let Err(e) = forward(&mut writer, &line).await {
            debug!("Client stopped reading: {e}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::tools::ToolRegistry;
    use rmcp::ServiceError;
    use rmcp::model::{
        CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation, ProtocolVersion,
    };
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::io::{AsyncBufRead, DuplexStream, Lines};
    use tokio::task::JoinHandle;

    const INITIALIZE: &str = concat!(
        r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2025-06-18","#,
        r#""capabilities":{},"clientInfo":{"name":"ecsplan-test","version":"0.0.0"}}}"#,
        "\n"
    );

    fn spawn_server() -> (JoinHandle<Result<ServeStats>>, DuplexStream) {
        let server = ToolServer::from_config(
            Arc::new(ToolRegistry::with_builtin_tools()),
            &ServerConfig::default(),
        );
        let (client_io, server_io) = tokio::io::duplex(PIPE_CAPACITY);
        let (read, write) = tokio::io::split(server_io);
        (tokio::spawn(serve(server, read, write)), client_io)
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "ecsplan-test".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
        }
    }

    async fn next_message<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
            .await
            .expect("timed out waiting for a reply")
            .expect("read failed")
            .expect("output closed");
        serde_json::from_str(&line).expect("json line")
    }

    async fn finish(handle: JoinHandle<Result<ServeStats>>) -> Result<ServeStats> {
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("session did not end")
            .expect("serve task panicked")
    }

    #[tokio::test]
    async fn test_client_session() {
        let (handle, client_io) = spawn_server();
        let client = client_info()
            .serve(tokio::io::split(client_io))
            .await
            .expect("initialize");

        let tools = client.list_tools(None).await.unwrap();
        assert_eq!(tools.tools.len(), 1);
        assert_eq!(tools.tools[0].name, "aws.ecs_plan");

        let result = client
            .call_tool(CallToolRequestParam {
                name: "aws.ecs_plan".into(),
                arguments: json!({"service": "web", "image": "web:1.2.3"})
                    .as_object()
                    .cloned(),
            })
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap()["content"][0]["text"],
            json!(r#"{"summary":"Update web to web:1.2.3. Health checks OK.","next_steps":["call aws.ecs_apply with plan_id"]}"#)
        );

        let err = client
            .call_tool(CallToolRequestParam {
                name: "aws.ecs_apply".into(),
                arguments: None,
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::McpError(data) => assert_eq!(data.code.0, -32602),
            other => panic!("unexpected error: {other}"),
        }

        client.cancel().await.unwrap();
        let stats = finish(handle).await.unwrap();
        assert_eq!(stats.rejected, 0);
        assert!(stats.forwarded >= 5);
    }

    #[tokio::test]
    async fn test_bad_lines_are_answered_and_session_continues() {
        let (handle, test_io) = spawn_server();
        let (read, mut write) = tokio::io::split(test_io);
        let mut lines = BufReader::new(read).lines();

        write.write_all(INITIALIZE.as_bytes()).await.unwrap();
        let init = next_message(&mut lines).await;
        assert_eq!(init["id"], json!(0));
        assert_eq!(init["result"]["serverInfo"]["name"], json!("ecsplan"));

        write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
            .await
            .unwrap();
        write.write_all(b"\xff\xfe\n[]\n42\n").await.unwrap();
        write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        let mut replies = Vec::new();
        for _ in 0..4 {
            replies.push(next_message(&mut lines).await);
        }

        let ping = replies
            .iter()
            .find(|r| r["id"] == json!(2))
            .expect("ping answered");
        assert_eq!(ping["result"], json!({}));

        let mut codes: Vec<i64> = replies
            .iter()
            .filter(|r| r["id"].is_null())
            .map(|r| r["error"]["code"].as_i64().unwrap())
            .collect();
        codes.sort_unstable();
        assert_eq!(codes, [-32700, -32600, -32600]);

        write.shutdown().await.unwrap();
        let stats = finish(handle).await.unwrap();
        assert_eq!(
            stats,
            ServeStats {
                forwarded: 3,
                rejected: 3
            }
        );
    }

    #[tokio::test]
    async fn test_input_closed_before_initialize() {
        let (handle, test_io) = spawn_server();
        let (_read, mut write) = tokio::io::split(test_io);
        write.shutdown().await.unwrap();

        let err = finish(handle).await.unwrap_err();
        assert!(matches!(err, EcsPlanError::Server(_)));
    }
}
