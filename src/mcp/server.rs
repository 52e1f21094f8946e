//! MCP Server
//!
//! Reads JSON-RPC messages, dispatches them and writes responses.
//!
//! # Concurrency
//!
//! Each request is handled on its own task so a slow TestRail call does not
//! hold up the others. Responses are funnelled through a channel into a single
//! writer task; they may leave in a different order than the requests arrived.

use crate::mcp::protocol::{
    InitializeParams, InitializeResult, McpError, McpMethod, McpRequest, McpResponse, ServerInfo,
    ToolCallParams, DEFAULT_PROTOCOL_VERSION, JSONRPC_VERSION,
};
use crate::mcp::tools;
use crate::mcp::transport::{MessageReader, MessageWriter};
use crate::testrail::service::TestRailService;
use crate::testrail::transport::Transport;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;

/// Name advertised in `serverInfo`
pub const SERVER_NAME: &str = "testrail-mcp";

/// Outstanding responses buffered ahead of the writer
const RESPONSE_QUEUE: usize = 64;

pub struct McpServer<T> {
    service: Arc<TestRailService<T>>,
    info: ServerInfo,
}

impl<T> Clone for McpServer<T> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            info: self.info.clone(),
        }
    }
}

impl<T: Transport + 'static> McpServer<T> {
    pub fn new(service: TestRailService<T>) -> Self {
        Self {
            service: Arc::new(service),
            info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn service(&self) -> &TestRailService<T> {
        &self.service
    }

    /// Serve until the input reaches end of stream.
    ///
    /// In-flight requests are allowed to finish and their responses are
    /// written before this returns.
    pub async fn serve<R, W>(&self, mut reader: MessageReader<R>, mut writer: MessageWriter<W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<McpResponse>(RESPONSE_QUEUE);

        let writer_task = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                if let Err(e) = writer.send(&response).await {
                    tracing::error!(error = %e, "Failed to write MCP response");
                    return Err(e);
                }
            }
            Ok(())
        });

        tracing::info!(server = SERVER_NAME, "MCP server listening on stdio");

        while let Some(line) = reader.next_message().await? {
            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    // The writer only goes away on a write failure, which is already logged.
                    let _ = tx.send(response).await;
                }
            });
        }

        tracing::info!("MCP client closed input; draining pending responses");
        drop(tx);

        writer_task.await??;
        Ok(())
    }

    /// Handle one raw message. `None` for notifications.
    ///
    /// Bytes that are not valid UTF-8 JSON get a parse error like any other
    /// malformed input.
    pub async fn handle_message(&self, line: impl AsRef<[u8]>) -> Option<McpResponse> {
        let value: Value = match serde_json::from_slice(line.as_ref()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Received unparseable MCP message");
                return Some(McpResponse::err(
                    Value::Null,
                    McpError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: McpRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(McpResponse::err(
                    id,
                    McpError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::err(
                id,
                McpError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            ));
        }

        self.handle_request(request).await
    }

    /// Dispatch a parsed request
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let method = McpMethod::from(request.method.as_str());

        let Some(id) = request.id else {
            match method {
                McpMethod::Initialized => tracing::info!("MCP client initialized"),
                other => tracing::debug!(method = other.as_str(), "Ignoring notification"),
            }
            return None;
        };

        let result = match method {
            McpMethod::Initialize => self.initialize(request.params),
            McpMethod::Ping => Ok(json!({})),
            McpMethod::ToolsList => Ok(json!({ "tools": tools::definitions() })),
            McpMethod::ToolsCall => self.call_tool(request.params).await,
            McpMethod::Initialized => Err(McpError::invalid_request(
                "notifications/initialized must be sent as a notification",
            )),
            McpMethod::Other(name) => Err(McpError::method_not_found(name)),
        };

        Some(match result {
            Ok(result) => McpResponse::ok(id, result),
            Err(error) => McpResponse::err(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params)
                .map_err(|e| McpError::invalid_params(format!("Invalid initialize params: {}", e)))?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, client_version = %client.version, "MCP client connected");
        }

        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            capabilities: json!({ "tools": { "listChanged": false } }),
            server_info: self.info.clone(),
        };

        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = params
            .ok_or_else(|| McpError::invalid_params("tools/call requires params"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| McpError::invalid_params(format!("Invalid tools/call params: {}", e)))
            })?;

        let result = tools::call_tool(&self.service, &params.name, params.arguments).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }
}
