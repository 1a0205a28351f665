use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::load_balancer;

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_load_balancers", "List classic load balancers in a compartment")
            .param(compartment_id())
            .start("Listing load balancers in compartment {compartment_id}...")
            .error("Error listing load balancers")
            .run(|env, args| {
                Box::pin(async move {
                    load_balancer::list_load_balancers(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar(
            "get_load_balancer",
            "Get a load balancer with its listeners, backend sets and hostnames",
        )
        .param(Param::ocid("load_balancer_id", "OCID of the load balancer"))
        .start("Getting load balancer {load_balancer_id}...")
        .success("Retrieved load balancer successfully")
        .error("Error getting load balancer")
        .run(|env, args| {
            Box::pin(async move {
                load_balancer::get_load_balancer(env.clients()?, args.str("load_balancer_id")?).await
            })
        }),
        ToolSpec::list("list_network_load_balancers", "List network load balancers in a compartment")
            .param(compartment_id())
            .start("Listing network load balancers in compartment {compartment_id}...")
            .error("Error listing network load balancers")
            .run(|env, args| {
                Box::pin(async move {
                    load_balancer::list_network_load_balancers(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar("get_network_load_balancer", "Get a network load balancer with its listeners and backend sets")
            .param(Param::ocid("network_load_balancer_id", "OCID of the network load balancer"))
            .start("Getting network load balancer {network_load_balancer_id}...")
            .success("Retrieved network load balancer successfully")
            .error("Error getting network load balancer")
            .run(|env, args| {
                Box::pin(async move {
                    load_balancer::get_network_load_balancer(env.clients()?, args.str("network_load_balancer_id")?)
                        .await
                })
            }),
    ]
}
