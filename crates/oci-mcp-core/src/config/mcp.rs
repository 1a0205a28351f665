//! MCP server configuration.
//!
//! Transport selection and listener address. The transport is fixed at
//! startup; it is never negotiated with the client.

use serde::{Deserialize, Serialize};

/// Default port for the HTTP/SSE listener.
pub const DEFAULT_SSE_PORT: u16 = 45678;

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "stdio" or "sse".
    #[serde(default)]
    pub transport: Transport,

    /// Host to bind (only used when transport is SSE).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (only used when transport is SSE).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// MCP transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Standard input/output transport, one session per process.
    #[default]
    Stdio,
    /// HTTP listener with Server-Sent Events.
    #[serde(alias = "http")]
    Sse,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl McpConfig {
    /// Check if using the HTTP/SSE transport.
    pub fn is_sse(&self) -> bool {
        self.transport == Transport::Sse
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }

    /// Address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_SSE_PORT
}
