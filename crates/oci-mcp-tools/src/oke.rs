//! Kubernetes engine (OKE) clusters, node pools and work requests.

use crate::error::ToolError;
use crate::projection::{Field, path, verbatim};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::{Value, json};

const CLUSTER: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("lifecycle_details", "lifecycleDetails"),
    path("vcn_id", "vcnId"),
    path("kubernetes_version", "kubernetesVersion"),
    path("time_created", "metadata.timeCreated"),
    path("time_updated", "metadata.timeUpdated"),
    path("endpoint_config", "endpointConfig"),
    path("type", "type"),
];

const CLUSTER_DETAIL: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("lifecycle_details", "lifecycleDetails"),
    path("vcn_id", "vcnId"),
    path("kubernetes_version", "kubernetesVersion"),
    path("time_created", "metadata.timeCreated"),
    path("time_updated", "metadata.timeUpdated"),
    path("endpoint_config", "endpointConfig"),
    path("endpoints", "endpoints"),
    path("metadata", "metadata"),
    path("options", "options"),
    path("available_kubernetes_upgrades", "availableKubernetesUpgrades"),
    path("image_policy_config", "imagePolicyConfig"),
    path("cluster_pod_network_options", "clusterPodNetworkOptions"),
    path("type", "type"),
    verbatim("freeform_tags", "freeformTags"),
    verbatim("defined_tags", "definedTags"),
];

const NODE_POOL: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("compartment_id", "compartmentId"),
    path("cluster_id", "clusterId"),
    path("lifecycle_state", "lifecycleState"),
    path("lifecycle_details", "lifecycleDetails"),
    path("kubernetes_version", "kubernetesVersion"),
    path("node_image_name", "nodeImageName"),
    path("node_shape", "nodeShape"),
    path("quantity_per_subnet", "quantityPerSubnet"),
    path("subnet_ids", "subnetIds"),
    path("node_config_details", "nodeConfigDetails"),
    path("time_created", "timeCreated"),
];

const NODE_POOL_DETAIL: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("compartment_id", "compartmentId"),
    path("cluster_id", "clusterId"),
    path("lifecycle_state", "lifecycleState"),
    path("lifecycle_details", "lifecycleDetails"),
    path("kubernetes_version", "kubernetesVersion"),
    path("node_image_id", "nodeImageId"),
    path("node_image_name", "nodeImageName"),
    path("node_shape", "nodeShape"),
    path("node_shape_config", "nodeShapeConfig"),
    path("node_source_details", "nodeSourceDetails"),
    path("node_config_details", "nodeConfigDetails"),
    path("initial_node_labels", "initialNodeLabels"),
    path("ssh_public_key", "sshPublicKey"),
    path("quantity_per_subnet", "quantityPerSubnet"),
    path("subnet_ids", "subnetIds"),
    path("nodes", "nodes"),
    path("node_eviction_node_pool_settings", "nodeEvictionNodePoolSettings"),
    path("node_pool_cycling_details", "nodePoolCyclingDetails"),
    verbatim("freeform_tags", "freeformTags"),
    verbatim("defined_tags", "definedTags"),
    path("time_created", "timeCreated"),
];

const WORK_REQUEST: &[Field] = &[
    path("id", "id"),
    path("operation_type", "operationType"),
    path("status", "status"),
    path("compartment_id", "compartmentId"),
    path("resources", "resources"),
    path("percent_complete", "percentComplete"),
    path("time_accepted", "timeAccepted"),
    path("time_started", "timeStarted"),
    path("time_finished", "timeFinished"),
];

pub async fn list_clusters(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.container_engine,
        "/clusters",
        Query::new().with("compartmentId", compartment_id),
        CLUSTER,
    )
    .await
}

pub async fn get_cluster(clients: &ClientTable, cluster_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.container_engine,
        &format!("/clusters/{cluster_id}"),
        CLUSTER_DETAIL,
    )
    .await
}

pub async fn list_node_pools(
    clients: &ClientTable,
    compartment_id: &str,
    cluster_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.container_engine,
        "/nodePools",
        Query::new()
            .with("compartmentId", compartment_id)
            .with_opt("clusterId", cluster_id),
        NODE_POOL,
    )
    .await
}

/// Node pool with its nodes, placement and shape configuration.
pub async fn get_node_pool(clients: &ClientTable, node_pool_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.container_engine,
        &format!("/nodePools/{node_pool_id}"),
        NODE_POOL_DETAIL,
    )
    .await
}

/// Generate a kubeconfig document for a cluster.
pub async fn get_cluster_kubeconfig(
    clients: &ClientTable,
    cluster_id: &str,
) -> Result<Value, ToolError> {
    let content = clients
        .container_engine
        .post(
            &format!("/clusters/{cluster_id}/kubeconfig/content"),
            Query::new(),
            json!({}),
        )
        .await?;

    let kubeconfig = match content {
        Value::String(text) => text,
        other => {
            return Err(ToolError::UnexpectedResponse(format!(
                "kubeconfig is not text: {other}"
            )));
        }
    };
    tracing::info!(cluster_id, "Retrieved kubeconfig");

    Ok(json!({
        "cluster_id": cluster_id,
        "kubeconfig": kubeconfig,
        "format": "yaml",
        "usage": "Save this content to ~/.kube/config or use with kubectl --kubeconfig flag",
    }))
}

pub async fn list_work_requests(
    clients: &ClientTable,
    compartment_id: &str,
    resource_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.container_engine,
        "/workRequests",
        Query::new()
            .with("compartmentId", compartment_id)
            .with_opt("resourceId", resource_id),
        WORK_REQUEST,
    )
    .await
}

pub async fn get_work_request(clients: &ClientTable, work_request_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.container_engine,
        &format!("/workRequests/{work_request_id}"),
        WORK_REQUEST,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_table;
    use oci_mcp_client::Method;

    #[tokio::test]
    async fn test_kubeconfig_record() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Post,
            "/clusters/k1/kubeconfig/content",
            json!("apiVersion: v1\nkind: Config\n"),
        );

        let result = get_cluster_kubeconfig(&clients, "k1").await.unwrap();
        assert_eq!(result["cluster_id"], "k1");
        assert_eq!(result["format"], "yaml");
        assert!(result["kubeconfig"].as_str().unwrap().starts_with("apiVersion"));
    }

    #[tokio::test]
    async fn test_kubeconfig_must_be_text() {
        let (mock, clients) = mock_table();
        mock.on(Method::Post, "/clusters/k1/kubeconfig/content", json!({"x": 1}));
        assert!(matches!(
            get_cluster_kubeconfig(&clients, "k1").await,
            Err(ToolError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_node_pools_filter_by_cluster() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/nodePools",
            json!([{
                "id": "np1",
                "nodeShape": "VM.Standard.E4.Flex",
                "nodeConfigDetails": {"size": 3, "placementConfigs": [{"availabilityDomain": "AD-1"}]}
            }]),
        );

        let pools = list_node_pools(&clients, "c", Some("k1")).await.unwrap();
        assert_eq!(pools[0]["node_config_details"]["size"], 3);
        assert_eq!(
            pools[0]["node_config_details"]["placement_configs"][0]["availability_domain"],
            "AD-1"
        );
        assert_eq!(mock.calls()[0].query.get("clusterId"), Some("k1"));
    }

    #[tokio::test]
    async fn test_work_request_resources() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/workRequests/wr1",
            json!({
                "id": "wr1",
                "status": "SUCCEEDED",
                "resources": [{"actionType": "CREATED", "entityType": "cluster", "identifier": "k1"}]
            }),
        );

        let wr = get_work_request(&clients, "wr1").await.unwrap();
        assert_eq!(wr["resources"][0]["action_type"], "CREATED");
        assert!(wr["percent_complete"].is_null());
    }
}
