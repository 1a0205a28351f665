//! Error types for tool operations.

use oci_mcp_client::ClientError;
use thiserror::Error;

/// A technical fault raised by a tool.
///
/// Business outcomes (already running, wrong state) are never errors; they
/// are returned as `{"success": ..}` records instead.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A remote call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A required argument was not supplied.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// An argument was supplied but is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The call needs OCI clients but no profile is loaded.
    #[error("no OCI profile is active; use set_oci_profile first")]
    NoActiveProfile,

    /// The response did not contain what the tool needed.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
