//! The tool catalogue.
//!
//! Each submodule returns the tools of one OCI domain. Registration is
//! explicit: every entry names its parameters, result shape, messages and
//! the proxy function it calls.

mod compute;
mod cost;
mod database;
mod identity;
mod load_balancer;
mod monitoring;
mod network;
mod oke;
mod platform;
mod profile;
mod security;
mod storage;

use crate::error::McpError;
use crate::tools::{Param, ToolRegistry, ToolSpec};

/// Every tool, profile tools first.
pub fn all() -> Vec<ToolSpec> {
    [
        profile::tools(),
        platform::tools(),
        compute::tools(),
        network::tools(),
        identity::tools(),
        storage::tools(),
        database::tools(),
        security::tools(),
        load_balancer::tools(),
        monitoring::tools(),
        oke::tools(),
        cost::tools(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// A registry holding the full catalogue.
pub fn registry() -> Result<ToolRegistry, McpError> {
    let mut registry = ToolRegistry::new();
    registry.register_all(all())?;
    tracing::debug!(tools = registry.len(), "Registered tool catalogue");
    Ok(registry)
}

fn compartment_id() -> Param {
    Param::ocid("compartment_id", "OCID of the compartment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_registers_cleanly() {
        let registry = registry().unwrap();
        for name in [
            "list_oci_profiles",
            "get_current_oci_profile",
            "set_oci_profile",
            "list_compartments",
            "list_instances",
            "start_instance",
            "create_instance",
            "terminate_instance",
            "list_subnets",
            "get_namespace",
            "start_db_system",
            "softreset_db_node",
            "list_keys",
            "get_network_load_balancer",
            "query_metric_data",
            "search_logs",
            "get_cluster_kubeconfig",
            "get_cost_by_service",
            "get_budget",
        ] {
            assert!(registry.contains(name), "{name} is not registered");
        }
    }

    #[test]
    fn test_list_and_get_shapes() {
        use crate::outcome::ResultShape;

        for spec in all() {
            if spec.name.starts_with("list_") && spec.name != "list_oci_profiles" {
                assert_eq!(spec.shape, ResultShape::List, "{}", spec.name);
            }
            if spec.name.starts_with("get_") && !spec.name.starts_with("get_cost_by")
                && spec.name != "get_alarm_history" && spec.name != "get_cost_usage_summary"
            {
                assert_eq!(spec.shape, ResultShape::Scalar, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_only_profile_tools_work_without_clients() {
        let without: Vec<&str> = all()
            .iter()
            .filter(|spec| !spec.needs_clients)
            .map(|spec| spec.name)
            .collect();
        assert_eq!(
            without,
            vec!["list_oci_profiles", "get_current_oci_profile", "set_oci_profile"]
        );
    }
}
