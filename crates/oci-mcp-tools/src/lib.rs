//! # oci-mcp-tools
//!
//! Resource proxy functions for the OCI MCP server.
//!
//! Each domain module exposes plain async functions taking a
//! [`ClientTable`] and typed arguments and returning a JSON record (or a list
//! of records). Records are flat, snake_case projections of the OCI objects,
//! described by the [`projection`] tables at the top of each module.
//!
//! State-changing operations check the current lifecycle state first and
//! return a `{"success": ..}` business record instead of failing when the
//! resource is in the wrong state.

pub mod cloud_init;
pub mod compartments;
pub mod compute;
pub mod cost;
pub mod database;
pub mod error;
pub mod identity;
pub mod load_balancer;
pub mod monitoring;
pub mod network;
pub mod oke;
pub mod poll;
pub mod projection;
pub mod resources;
pub mod security;
pub mod storage;

pub use error::ToolError;
pub use poll::{PollOutcome, PollPolicy};

use oci_mcp_client::{ClientTable, Query, ServiceClient};
use projection::{Field, project, project_all};
use serde_json::Value;

/// GET one resource and project it.
pub(crate) async fn fetch_one(
    client: &ServiceClient,
    path: &str,
    fields: &[Field],
) -> Result<Value, ToolError> {
    let body = client.get(path, Query::new()).await?;
    Ok(project(&body, fields))
}

/// GET every page of a list and project each element.
pub(crate) async fn fetch_all(
    client: &ServiceClient,
    path: &str,
    query: Query,
    fields: &[Field],
) -> Result<Value, ToolError> {
    let items = client.list_all(path, query).await?;
    tracing::debug!(service = %client.service(), path, count = items.len(), "Listed resources");
    Ok(project_all(&items, fields))
}

/// Check that `value` looks like an OCID before it names a resource path.
pub fn require_ocid<'a>(name: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let well_formed = value
        .strip_prefix("ocid1.")
        .is_some_and(|rest| {
            !rest.is_empty()
                && !rest
                    .chars()
                    .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        });
    if well_formed {
        Ok(value)
    } else {
        Err(ToolError::InvalidArgument(format!(
            "'{name}' is not a valid OCID: {value:?}"
        )))
    }
}

/// Compartment to use when the caller gave none.
pub(crate) fn compartment_or_tenancy<'a>(
    clients: &'a ClientTable,
    compartment_id: Option<&'a str>,
) -> &'a str {
    compartment_id.unwrap_or_else(|| clients.tenancy())
}
