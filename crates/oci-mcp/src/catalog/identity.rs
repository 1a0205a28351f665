use super::compartment_id;
use crate::tools::{Param, ToolSpec};
use oci_mcp_tools::identity;

pub(super) fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::list("list_users", "List IAM users in a compartment (usually the tenancy)")
            .param(compartment_id())
            .start("Listing users in compartment {compartment_id}...")
            .error("Error listing users")
            .run(|env, args| {
                Box::pin(async move { identity::list_users(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_user", "Get details of an IAM user")
            .param(Param::ocid("user_id", "OCID of the user"))
            .start("Getting user {user_id}...")
            .success("Retrieved user details successfully")
            .error("Error getting user")
            .run(|env, args| {
                Box::pin(async move { identity::get_user(env.clients()?, args.str("user_id")?).await })
            }),
        ToolSpec::list("list_groups", "List IAM groups in a compartment")
            .param(compartment_id())
            .start("Listing groups in compartment {compartment_id}...")
            .error("Error listing groups")
            .run(|env, args| {
                Box::pin(async move { identity::list_groups(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_group", "Get details of an IAM group")
            .param(Param::ocid("group_id", "OCID of the group"))
            .start("Getting group {group_id}...")
            .success("Retrieved group details successfully")
            .error("Error getting group")
            .run(|env, args| {
                Box::pin(async move { identity::get_group(env.clients()?, args.str("group_id")?).await })
            }),
        ToolSpec::list("list_policies", "List IAM policies in a compartment")
            .param(compartment_id())
            .start("Listing policies in compartment {compartment_id}...")
            .error("Error listing policies")
            .run(|env, args| {
                Box::pin(async move { identity::list_policies(env.clients()?, args.str("compartment_id")?).await })
            }),
        ToolSpec::scalar("get_policy", "Get an IAM policy with its statements")
            .param(Param::ocid("policy_id", "OCID of the policy"))
            .start("Getting policy {policy_id}...")
            .success("Retrieved policy details successfully")
            .error("Error getting policy")
            .run(|env, args| {
                Box::pin(async move { identity::get_policy(env.clients()?, args.str("policy_id")?).await })
            }),
        ToolSpec::list("list_dynamic_groups", "List dynamic groups in a compartment")
            .param(compartment_id())
            .start("Listing dynamic groups in compartment {compartment_id}...")
            .error("Error listing dynamic groups")
            .run(|env, args| {
                Box::pin(async move {
                    identity::list_dynamic_groups(env.clients()?, args.str("compartment_id")?).await
                })
            }),
        ToolSpec::scalar("get_dynamic_group", "Get a dynamic group with its matching rule")
            .param(Param::ocid("dynamic_group_id", "OCID of the dynamic group"))
            .start("Getting dynamic group {dynamic_group_id}...")
            .success("Retrieved dynamic group details successfully")
            .error("Error getting dynamic group")
            .run(|env, args| {
                Box::pin(async move {
                    identity::get_dynamic_group(env.clients()?, args.str("dynamic_group_id")?).await
                })
            }),
    ]
}
