use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::oke;

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_clusters", "List Kubernetes (OKE) clusters in a compartment")
            .param(compartment_id())
            .start("Listing OKE clusters in compartment {compartment_id}...")
            .error("Error listing OKE clusters")
            .run(|env, args| {
                Box::pin(async move { oke::list_clusters(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_cluster", "Get details of an OKE cluster, including its endpoints")
            .param(Param::ocid("cluster_id", "OCID of the cluster"))
            .start("Getting OKE cluster {cluster_id}...")
            .success("Retrieved OKE cluster successfully")
            .error("Error getting OKE cluster")
            .run(|env, args| {
                Box::pin(async move { oke::get_cluster(env.clients()?, args.str("cluster_id")?).await })
            }),
        ToolSpec::list("list_node_pools", "List node pools in a compartment, optionally for one cluster")
            .param(compartment_id())
            .param(Param::ocid("cluster_id", "OCID of the cluster").optional())
            .start("Listing node pools in compartment {compartment_id}...")
            .error("Error listing node pools")
            .run(|env, args| {
                Box::pin(async move {
                    oke::list_node_pools(env.clients()?, args.str("compartment_id")?, args.opt_str("cluster_id")?)
                        .await
                })
            }),
        ToolSpec::scalar("get_node_pool", "Get a node pool with its nodes")
            .param(Param::ocid("node_pool_id", "OCID of the node pool"))
            .start("Getting node pool {node_pool_id}...")
            .success("Retrieved node pool successfully")
            .error("Error getting node pool")
            .run(|env, args| {
                Box::pin(async move { oke::get_node_pool(env.clients()?, args.str("node_pool_id")?).await })
            }),
        ToolSpec::scalar("get_cluster_kubeconfig", "Generate a kubeconfig for an OKE cluster")
            .param(Param::ocid("cluster_id", "OCID of the cluster"))
            .start("Generating kubeconfig for cluster {cluster_id}...")
            .success("Generated kubeconfig for cluster {cluster_id}")
            .error("Error generating kubeconfig")
            .run(|env, args| {
                Box::pin(async move { oke::get_cluster_kubeconfig(env.clients()?, args.str("cluster_id")?).await })
            }),
        ToolSpec::list("list_work_requests", "List container engine work requests in a compartment")
            .param(compartment_id())
            .param(Param::ocid("resource_id", "Only return work requests for this resource").optional())
            .start("Listing work requests in compartment {compartment_id}...")
            .error("Error listing work requests")
            .run(|env, args| {
                Box::pin(async move {
                    oke::list_work_requests(env.clients()?, args.str("compartment_id")?, args.opt_str("resource_id")?)
                        .await
                })
            }),
        ToolSpec::scalar("get_work_request", "Get details of a container engine work request")
            .param(Param::ocid("work_request_id", "OCID of the work request"))
            .start("Getting work request {work_request_id}...")
            .success("Retrieved work request successfully")
            .error("Error getting work request")
            .run(|env, args| {
                Box::pin(async move { oke::get_work_request(env.clients()?, args.str("work_request_id")?).await })
            }),
    ]
}
