//! Error types for the MCP crate.

use thiserror::Error;

/// Protocol, transport and startup failures.
///
/// Tool faults never surface here; they become error outcomes inside the
/// tool call.
#[derive(Debug, Error)]
pub enum McpError {
    /// The SSE listener could not be bound.
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// `tools/call` named a tool that is not in the catalogue.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// A tool was registered twice or with an unusable schema.
    #[error("invalid tool definition {tool}: {reason}")]
    InvalidTool { tool: String, reason: String },

    /// The stdio writer task died.
    #[error("stdout writer failed: {0}")]
    Writer(#[from] tokio::task::JoinError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
