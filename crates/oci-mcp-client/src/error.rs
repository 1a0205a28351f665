//! Error types for the client crate.

use oci_mcp_core::ConfigError;
use thiserror::Error;

/// Errors returned by remote resource calls.
///
/// The `Display` text is what callers of a tool see after the error prefix,
/// so it stays a single human-readable line.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("{code} ({status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        opc_request_id: Option<String>,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request could not be built (bad endpoint, bad path).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Signing key could not be loaded or used.
    #[error("authentication setup failed: {0}")]
    Auth(String),

    /// Profile or credentials file problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported the resource as missing or hidden.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
