//! Compartment hierarchy of the tenancy.

use crate::error::ToolError;
use crate::projection::{Field, equals, path, project};
use oci_mcp_client::{ClientTable, Query};
use oci_mcp_core::state::compartment as state;
use serde_json::{Value, json};

const COMPARTMENT: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("parent_compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    equals("is_accessible", "lifecycleState", state::ACTIVE),
    path("time_created", "timeCreated"),
];

const ROOT: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
];

fn with_flags(mut record: Value, is_root: bool) -> Value {
    if let Value::Object(map) = &mut record {
        if is_root {
            map.insert("is_accessible".to_string(), json!(true));
        }
        map.insert("is_root".to_string(), json!(is_root));
    }
    record
}

/// The root compartment (when readable) followed by every ACTIVE compartment
/// below it.
pub async fn list_compartments(clients: &ClientTable) -> Result<Value, ToolError> {
    let tenancy = clients.tenancy();
    let mut compartments = Vec::new();

    match clients
        .identity
        .get(&format!("/compartments/{tenancy}"), Query::new())
        .await
    {
        Ok(root) => compartments.push(with_flags(project(&root, ROOT), true)),
        Err(e) => tracing::warn!(tenancy, error = %e, "Could not get root compartment"),
    }

    let subtree = clients
        .identity
        .list_all(
            "/compartments",
            Query::new()
                .with("compartmentId", tenancy)
                .with("compartmentIdInSubtree", "true")
                .with("accessLevel", "ANY")
                .with("lifecycleState", state::ACTIVE),
        )
        .await?;
    compartments.extend(
        subtree
            .iter()
            .map(|c| with_flags(project(c, COMPARTMENT), false)),
    );

    tracing::info!(count = compartments.len(), "Found compartments");
    Ok(Value::Array(compartments))
}
