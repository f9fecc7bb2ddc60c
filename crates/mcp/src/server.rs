// MCP server: newline-delimited JSON-RPC over stdio

use crate::protocol::{
    to_result_value, CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability, PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "Stock Price Server";

pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Answer one request per input line until the reader reaches EOF.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new());
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        while let Some(line) = lines.next().await {
            let line = line.context("Failed to read request line")?;
            if let Some(response) = self.handle_line(&line).await {
                let encoded = serde_json::to_string(&response).context("Failed to encode response")?;
                sink.send(encoded).await.context("Failed to write response")?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications and blank lines produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable message");
                return Some(JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error()));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Malformed request");
                let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone().unwrap_or(serde_json::Value::Null);
        Some(match self.handle_request(request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Result<serde_json::Value, JsonRpcError> {
        debug!(method = %request.method, "Handling request");

        match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result_value(ListToolsResult {
                tools: self.registry.list_schemas(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value, JsonRpcError> {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(params) => info!(
                    client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
                    protocol = %params.protocol_version,
                    "Client initializing"
                ),
                Err(e) => debug!(error = %e, "Ignoring unrecognised initialize params"),
            }
        }

        to_result_value(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    async fn call_tool(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
            })?;

        let tool = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        info!(tool = %params.name, "Calling tool");
        match tool.execute(params.arguments).await {
            Ok(result) => to_result_value(result),
            Err(e) if e.downcast_ref::<serde_json::Error>().is_some() => {
                Err(JsonRpcError::invalid_params(format!("{:#}", e)))
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool execution failed");
                Err(JsonRpcError::internal_error(format!("{:#}", e)))
            }
        }
    }
}
