//! HTTP/SSE transport for the MCP server.
//!
//! `GET /sse` opens a session. Its first event is `endpoint`, naming the URL
//! the client posts requests to (`/messages?session_id=<uuid>`). Responses and
//! `notifications/message` entries come back as `message` events on the same
//! stream. Each session has a worker task that handles its requests one at a
//! time; closing the stream aborts the worker and drops any call in flight.
//!
//! `POST /mcp` is a plain request/response endpoint without notifications.

use crate::error::McpError;
use crate::protocol::codes;
use crate::server::{McpServer, Session};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tokio::task::AbortHandle;
use tower_http::trace::TraceLayer;

/// Requests a session may have waiting for its worker.
const SESSION_QUEUE_DEPTH: usize = 32;

/// HTTP transport handler state.
pub struct HttpTransportState {
    server: McpServer,
    /// Request queues of the open SSE sessions.
    sessions: RwLock<HashMap<String, mpsc::Sender<String>>>,
}

impl HttpTransportState {
    pub fn new(server: McpServer) -> Self {
        Self {
            server,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Query parameters for the message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: String,
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_message))
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unregisters the session and stops its worker when the stream is dropped.
struct SessionGuard {
    id: String,
    worker: AbortHandle,
    state: Arc<HttpTransportState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.worker.abort();
        let id = std::mem::take(&mut self.id);
        let state = self.state.clone();
        tokio::spawn(async move {
            state.sessions.write().await.remove(&id);
            tracing::info!(session_id = %id, "SSE session closed");
        });
    }
}

/// Handle `GET /sse`: open a session.
async fn handle_sse(State(state): State<Arc<HttpTransportState>>) -> impl IntoResponse {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
    let (req_tx, mut req_rx) = mpsc::channel::<String>(SESSION_QUEUE_DEPTH);

    let server = state.server.clone();
    let worker = tokio::spawn(async move {
        let mut session = Session::new(out_tx.clone());
        while let Some(body) = req_rx.recv().await {
            if let Some(response) = server.handle_message(&body, &mut session).await {
                match serde_json::to_value(response) {
                    Ok(message) => {
                        let _ = out_tx.send(message);
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to serialize response"),
                }
            }
        }
    });

    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), req_tx);
    tracing::info!(session_id = %session_id, "SSE session opened");

    let guard = SessionGuard {
        id: session_id.clone(),
        worker: worker.abort_handle(),
        state: state.clone(),
    };
    let endpoint = format!("/messages?session_id={session_id}");

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(message) = out_rx.recv().await {
            yield Ok(Event::default().event("message").data(message.to_string()));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
}

/// Handle `POST /messages?session_id=`: queue a request for the session.
///
/// A session whose queue is full answers 503 until its worker catches up.
async fn handle_message(
    State(state): State<Arc<HttpTransportState>>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let sessions = state.sessions.read().await;
    let Some(queue) = sessions.get(&query.session_id) else {
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };
    match queue.try_send(body) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(session_id = %query.session_id, "SSE session queue full");
            (StatusCode::SERVICE_UNAVAILABLE, "Session busy").into_response()
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            (StatusCode::GONE, "Session closed").into_response()
        }
    }
}

/// Handle `POST /mcp`: answer one request in the HTTP response.
async fn handle_mcp_post(State(state): State<Arc<HttpTransportState>>, body: String) -> Response {
    let mut session = Session::detached();
    match state.server.handle_message(&body, &mut session).await {
        Some(response) => {
            let status = match &response.error {
                Some(error) if error.code == codes::PARSE_ERROR => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, Json(response)).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health(State(state): State<Arc<HttpTransportState>>) -> impl IntoResponse {
    let profile = state.server.profiles().current_profile_name().await;
    Json(serde_json::json!({
        "status": "ok",
        "service": "oci-mcp-server",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.session_count().await,
        "current_profile": profile,
        "tools": state.server.registry().len(),
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    pub fn new(server: McpServer) -> Self {
        Self {
            address: server.config().bind_address(),
            state: Arc::new(HttpTransportState::new(server)),
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|source| McpError::Bind {
                address: self.address.clone(),
                source,
            })?;

        tracing::info!(address = %self.address, "MCP SSE server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Internal(anyhow::Error::new(e).context("SSE server stopped")))?;

        Ok(())
    }
}
