//! Load balancers and network load balancers.

use crate::error::ToolError;
use crate::projection::{Field, named_map, path, verbatim};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::Value;

const LOAD_BALANCER: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("shape_name", "shapeName"),
    path("is_private", "isPrivate"),
    path("ip_addresses", "ipAddresses"),
    path("subnet_ids", "subnetIds"),
    path("network_security_group_ids", "networkSecurityGroupIds"),
];

const LOAD_BALANCER_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("shape_name", "shapeName"),
    path("is_private", "isPrivate"),
    path("ip_addresses", "ipAddresses"),
    path("subnet_ids", "subnetIds"),
    path("network_security_group_ids", "networkSecurityGroupIds"),
    named_map("backend_sets", "backendSets"),
    named_map("listeners", "listeners"),
    named_map("certificates", "certificates"),
    named_map("path_route_sets", "pathRouteSets"),
    named_map("hostnames", "hostnames"),
    verbatim("freeform_tags", "freeformTags"),
];

const NETWORK_LOAD_BALANCER: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("is_private", "isPrivate"),
    path("ip_addresses", "ipAddresses"),
    path("subnet_id", "subnetId"),
    path("network_security_group_ids", "networkSecurityGroupIds"),
    path("is_preserve_source_destination", "isPreserveSourceDestination"),
];

const NETWORK_LOAD_BALANCER_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("is_private", "isPrivate"),
    path("ip_addresses", "ipAddresses"),
    path("subnet_id", "subnetId"),
    path("network_security_group_ids", "networkSecurityGroupIds"),
    path("is_preserve_source_destination", "isPreserveSourceDestination"),
    named_map("backend_sets", "backendSets"),
    named_map("listeners", "listeners"),
    verbatim("freeform_tags", "freeformTags"),
];

pub async fn list_load_balancers(
    clients: &ClientTable,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.load_balancer,
        "/loadBalancers",
        Query::new().with("compartmentId", compartment_id),
        LOAD_BALANCER,
    )
    .await
}

/// Load balancer with backend sets, listeners and certificates keyed by name.
pub async fn get_load_balancer(
    clients: &ClientTable,
    load_balancer_id: &str,
) -> Result<Value, ToolError> {
    fetch_one(
        &clients.load_balancer,
        &format!("/loadBalancers/{load_balancer_id}"),
        LOAD_BALANCER_DETAIL,
    )
    .await
}

pub async fn list_network_load_balancers(
    clients: &ClientTable,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.network_load_balancer,
        "/networkLoadBalancers",
        Query::new().with("compartmentId", compartment_id),
        NETWORK_LOAD_BALANCER,
    )
    .await
}

pub async fn get_network_load_balancer(
    clients: &ClientTable,
    network_load_balancer_id: &str,
) -> Result<Value, ToolError> {
    fetch_one(
        &clients.network_load_balancer,
        &format!("/networkLoadBalancers/{network_load_balancer_id}"),
        NETWORK_LOAD_BALANCER_DETAIL,
    )
    .await
}
