use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::network;

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_vcns", "List virtual cloud networks in a compartment")
            .param(compartment_id())
            .start("Listing VCNs in compartment {compartment_id}...")
            .error("Error listing VCNs")
            .run(|env, args| {
                Box::pin(async move { network::list_vcns(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_vcn", "Get details of a virtual cloud network")
            .param(Param::ocid("vcn_id", "OCID of the VCN"))
            .start("Getting VCN {vcn_id}...")
            .success("Retrieved VCN details successfully")
            .error("Error getting VCN")
            .run(|env, args| {
                Box::pin(async move { network::get_vcn(env.clients()?, args.str("vcn_id")?).await })
            }),
        ToolSpec::list(
            "list_subnets",
            "List subnets in a compartment, for one VCN or for every VCN in the compartment",
        )
        .param(compartment_id())
        .param(Param::ocid("vcn_id", "OCID of the VCN").optional())
        .start("Listing subnets in compartment {compartment_id}...")
        .error("Error listing subnets")
        .run(|env, args| {
            Box::pin(async move {
                network::list_subnets(env.clients()?, args.str("compartment_id")?, args.opt_str("vcn_id")?)
                    .await
            })
        }),
        ToolSpec::scalar("get_subnet", "Get details of a subnet")
            .param(Param::ocid("subnet_id", "OCID of the subnet"))
            .start("Getting subnet {subnet_id}...")
            .success("Retrieved subnet details successfully")
            .error("Error getting subnet")
            .run(|env, args| {
                Box::pin(async move { network::get_subnet(env.clients()?, args.str("subnet_id")?).await })
            }),
        ToolSpec::list(
            "list_vnics",
            "List VNICs attached to instances in a compartment, optionally for one instance",
        )
        .param(compartment_id())
        .param(Param::ocid("instance_id", "OCID of the instance").optional())
        .start("Listing VNICs in compartment {compartment_id}...")
        .error("Error listing VNICs")
        .run(|env, args| {
            Box::pin(async move {
                network::list_vnics(env.clients()?, args.str("compartment_id")?, args.opt_str("instance_id")?)
                    .await
            })
        }),
        ToolSpec::scalar("get_vnic", "Get details of a VNIC")
            .param(Param::ocid("vnic_id", "OCID of the VNIC"))
            .start("Getting VNIC {vnic_id}...")
            .success("Retrieved VNIC details successfully")
            .error("Error getting VNIC")
            .run(|env, args| {
                Box::pin(async move { network::get_vnic(env.clients()?, args.str("vnic_id")?).await })
            }),
    ]
}
