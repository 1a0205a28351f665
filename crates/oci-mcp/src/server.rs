//! MCP server implementation.
//!
//! [`McpServer`] answers JSON-RPC requests against the tool registry. It is
//! cheap to clone; the transports hand a clone to every session.

use crate::context::{Notifier, Outbound};
use crate::error::McpError;
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::session::ProfileSession;
use crate::tools::{ToolEnv, ToolRegistry};
use oci_mcp_core::{McpConfig, Transport};
use oci_mcp_tools::PollPolicy;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

const SERVER_NAME: &str = "oci-mcp-server";

/// Per-connection protocol state.
#[derive(Debug, Clone)]
pub struct Session {
    outbound: Option<Outbound>,
    log_level: LogLevel,
}

impl Session {
    /// A session whose notifications go to `outbound`.
    pub fn new(outbound: Outbound) -> Self {
        Self {
            outbound: Some(outbound),
            log_level: LogLevel::default(),
        }
    }

    /// A one-shot session with nowhere to send notifications.
    pub fn detached() -> Self {
        Self {
            outbound: None,
            log_level: LogLevel::default(),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    fn notifier(&self) -> Notifier {
        match &self.outbound {
            Some(outbound) => Notifier::new(outbound.clone(), self.log_level),
            None => Notifier::silent(),
        }
    }
}

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    config: McpConfig,
    registry: Arc<ToolRegistry>,
    profiles: Arc<ProfileSession>,
    poll: PollPolicy,
}

impl McpServer {
    pub fn new(
        config: McpConfig,
        registry: ToolRegistry,
        profiles: Arc<ProfileSession>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            profiles,
            poll,
        }
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn profiles(&self) -> &Arc<ProfileSession> {
        &self.profiles
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Sse => self.run_sse().await,
        }
    }

    /// Run the server with stdio transport until stdin closes or the client
    /// sends `shutdown`.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!(tools = self.registry.len(), "Starting MCP server with stdio transport");

        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(message) = rx.recv().await {
                let mut line = message.to_string();
                line.push('\n');
                stdout.write_all(line.as_bytes()).await?;
                stdout.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut session = Session::new(tx.clone());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let shutdown = is_shutdown(&line);
            if let Some(response) = self.handle_message(&line, &mut session).await {
                // The writer only stops when the channel closes.
                let _ = tx.send(serde_json::to_value(response)?);
            }
            if shutdown {
                break;
            }
        }

        drop(session);
        drop(tx);
        writer.await??;
        tracing::info!("stdio session ended");
        Ok(())
    }

    /// Run the server with the HTTP/SSE transport.
    async fn run_sse(&self) -> Result<(), McpError> {
        HttpServer::new(self.clone()).run().await
    }

    /// Parse and answer one raw JSON-RPC message. `None` for notifications.
    pub async fn handle_message(&self, raw: &str, session: &mut Session) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable JSON-RPC message");
                return Some(JsonRpcResponse::error(
                    None,
                    codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request, session).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                codes::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
        }
    }

    /// Handle a JSON-RPC request. Notifications produce no response.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        session: &mut Session,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let notification = request.is_notification();
        tracing::debug!(method = %request.method, "Handling request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "notifications/initialized" | "initialized" => {
                tracing::info!("Client initialized");
                JsonRpcResponse::success(id, json!({}))
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params, session).await,
            "logging/setLevel" => handle_set_level(id, request.params, session),
            "shutdown" => {
                tracing::info!("MCP server shutdown requested");
                JsonRpcResponse::success(id, Value::Null)
            }
            other if notification => {
                tracing::debug!(method = %other, "Ignoring notification");
                return None;
            }
            other => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };

        if notification {
            None
        } else {
            Some(response)
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "capabilities": {
                    "tools": {"listChanged": false},
                    "logging": {},
                },
            }),
        )
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = ListToolsResponse {
            tools: self.registry.definitions(),
        };
        match serde_json::to_value(tools) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(
        &self,
        id: Option<Value>,
        params: Option<Value>,
        session: &Session,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, codes::INVALID_PARAMS, format!("Invalid params: {e}"));
            }
            None => return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"),
        };

        // One snapshot per call; a concurrent profile switch does not affect it.
        let env = ToolEnv::new(self.profiles.current().await, self.profiles.clone(), self.poll);
        let notifier = session.notifier();

        let Some(outcome) = self
            .registry
            .call(&params.name, &env, params.arguments, &notifier)
            .await
        else {
            tracing::warn!(tool = %params.name, "Unknown tool requested");
            let err = McpError::ToolNotFound { name: params.name };
            return JsonRpcResponse::error(id, codes::INVALID_PARAMS, err.to_string());
        };

        match serde_json::to_value(CallToolResponse::outcome(&outcome)) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }
}

fn handle_set_level(id: Option<Value>, params: Option<Value>, session: &mut Session) -> JsonRpcResponse {
    match params.map(serde_json::from_value::<SetLevelParams>) {
        Some(Ok(params)) => {
            session.log_level = params.level;
            tracing::debug!(level = ?params.level, "Notification level changed");
            JsonRpcResponse::success(id, json!({}))
        }
        Some(Err(e)) => JsonRpcResponse::error(id, codes::INVALID_PARAMS, format!("Invalid params: {e}")),
        None => JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"),
    }
}

fn is_shutdown(raw: &str) -> bool {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("method").and_then(Value::as_str).map(|m| m == "shutdown"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use oci_mcp_client::mock::MockApiFactory;

    fn server() -> McpServer {
        let profiles = ProfileSession::new("/nonexistent/oci/config", Arc::new(MockApiFactory::default()));
        McpServer::new(
            McpConfig::default(),
            catalog::registry().unwrap(),
            Arc::new(profiles),
            PollPolicy::default(),
        )
    }

    async fn call(server: &McpServer, method: &str, params: Option<Value>) -> JsonRpcResponse {
        let mut session = Session::detached();
        server
            .handle_request(JsonRpcRequest::new(1, method, params), &mut session)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = call(&server(), "initialize", None).await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let server = server();
        let response = call(&server, "tools/list", None).await;
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), server.registry().len());
        assert_eq!(tools[0]["name"], "list_oci_profiles");
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_call_nonexistent_tool() {
        let response = call(
            &server(),
            "tools/call",
            Some(json!({"name": "nonexistent", "arguments": {}})),
        )
        .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, codes::INVALID_PARAMS);
        assert!(error.message.contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_tool_without_profile_is_an_error_outcome() {
        let response = call(
            &server(),
            "tools/call",
            Some(json!({"name": "list_instances", "arguments": {"compartment_id": "ocid1.compartment.oc1..c"}})),
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let outcome: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        let message = outcome[0]["error"].as_str().unwrap();
        assert!(message.starts_with("Error listing instances: no OCI profile is active"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(&server(), "resources/list", None).await;
        assert_eq!(response.error.unwrap().code, codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server();
        let mut session = Session::detached();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                &mut session,
            )
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_parse_and_shape_errors() {
        let server = server();
        let mut session = Session::detached();

        let response = server.handle_message("{not json", &mut session).await.unwrap();
        assert_eq!(response.error.unwrap().code, codes::PARSE_ERROR);

        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":7}"#, &mut session)
            .await
            .unwrap();
        assert_eq!(response.id, Some(json!(7)));
        assert_eq!(response.error.unwrap().code, codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_set_level_filters_notifications() {
        let server = server();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::new(tx);

        let set = JsonRpcRequest::new(1, "logging/setLevel", Some(json!({"level": "error"})));
        let response = server.handle_request(set, &mut session).await.unwrap();
        assert!(response.error.is_none());
        assert_eq!(session.log_level(), LogLevel::Error);

        let call = JsonRpcRequest::new(
            2,
            "tools/call",
            Some(json!({"name": "get_image", "arguments": {"image_id": "ocid1.image.oc1..i"}})),
        );
        server.handle_request(call, &mut session).await.unwrap();

        // The start message is info level and filtered; the fault is not.
        let note = rx.try_recv().unwrap();
        assert_eq!(note["params"]["level"], "error");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_is_shutdown() {
        assert!(is_shutdown(r#"{"jsonrpc":"2.0","id":1,"method":"shutdown"}"#));
        assert!(!is_shutdown(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#));
        assert!(!is_shutdown("garbage"));
    }
}
