use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::security;

fn vcn_filter() -> Param {
    Param::ocid("vcn_id", "Only return entries of this VCN").optional()
}

fn management_endpoint() -> Param {
    Param::string(
        "management_endpoint",
        "Management endpoint of the vault holding the keys (see get_vault)",
    )
}

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_security_lists", "List security lists in a compartment")
            .param(compartment_id())
            .param(vcn_filter())
            .start("Listing security lists in compartment {compartment_id}...")
            .error("Error listing security lists")
            .run(|env, args| {
                Box::pin(async move {
                    security::list_security_lists(env.clients()?, args.str("compartment_id")?, args.opt_str("vcn_id")?)
                        .await
                })
            }),
        ToolSpec::scalar("get_security_list", "Get a security list with its ingress and egress rules")
            .param(Param::ocid("security_list_id", "OCID of the security list"))
            .start("Getting security list {security_list_id}...")
            .success("Retrieved security list successfully")
            .error("Error getting security list")
            .run(|env, args| {
                Box::pin(async move {
                    security::get_security_list(env.clients()?, args.str("security_list_id")?).await
                })
            }),
        ToolSpec::list("list_network_security_groups", "List network security groups in a compartment")
            .param(compartment_id())
            .param(vcn_filter())
            .start("Listing network security groups in compartment {compartment_id}...")
            .error("Error listing network security groups")
            .run(|env, args| {
                Box::pin(async move {
                    security::list_network_security_groups(
                        env.clients()?,
                        args.str("compartment_id")?,
                        args.opt_str("vcn_id")?,
                    )
                    .await
                })
            }),
        ToolSpec::scalar("get_network_security_group", "Get a network security group with its rules")
            .param(Param::ocid("nsg_id", "OCID of the network security group"))
            .start("Getting network security group {nsg_id}...")
            .success("Retrieved network security group successfully")
            .error("Error getting network security group")
            .run(|env, args| {
                Box::pin(async move {
                    security::get_network_security_group(env.clients()?, args.str("nsg_id")?).await
                })
            }),
        ToolSpec::list("list_vaults", "List KMS vaults in a compartment")
            .param(compartment_id())
            .start("Listing vaults in compartment {compartment_id}...")
            .error("Error listing vaults")
            .run(|env, args| {
                Box::pin(async move { security::list_vaults(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_vault", "Get details of a KMS vault, including its endpoints")
            .param(Param::ocid("vault_id", "OCID of the vault"))
            .start("Getting vault {vault_id}...")
            .success("Retrieved vault successfully")
            .error("Error getting vault")
            .run(|env, args| {
                Box::pin(async move { security::get_vault(env.clients()?, args.str("vault_id")?).await })
            }),
        ToolSpec::list("list_keys", "List keys held in a vault")
            .param(management_endpoint())
            .param(compartment_id())
            .start("Listing keys in compartment {compartment_id}...")
            .error("Error listing keys")
            .run(|env, args| {
                Box::pin(async move {
                    security::list_keys(
                        env.clients()?,
                        args.str("management_endpoint")?,
                        args.str("compartment_id")?,
                    )
                    .await
                })
            }),
        ToolSpec::scalar("get_key", "Get details of a vault key")
            .param(management_endpoint())
            .param(Param::ocid("key_id", "OCID of the key"))
            .start("Getting key {key_id}...")
            .success("Retrieved key successfully")
            .error("Error getting key")
            .run(|env, args| {
                Box::pin(async move {
                    security::get_key(env.clients()?, args.str("management_endpoint")?, args.str("key_id")?).await
                })
            }),
    ]
}
