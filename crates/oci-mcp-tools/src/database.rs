//! DB systems, DB nodes, databases and autonomous databases.

use crate::error::ToolError;
use crate::poll::{PollOutcome, PollPolicy, poll_until};
use crate::projection::{Field, lookup_str, path, project, project_all};
use crate::{fetch_all, fetch_one, require_ocid};
use oci_mcp_client::{ClientTable, Query};
use oci_mcp_core::state::db_node as state;
use serde_json::{Value, json};

const DB_SYSTEM: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("shape", "shape"),
    path("cpu_core_count", "cpuCoreCount"),
    path("node_count", "nodeCount"),
    path("database_edition", "databaseEdition"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("data_storage_size_in_gbs", "dataStorageSizeInGBs"),
    path("data_storage_percentage", "dataStoragePercentage"),
    path("license_model", "licenseModel"),
    path("version", "version"),
    path("hostname", "hostname"),
    path("domain", "domain"),
    path("backup_subnet_id", "backupSubnetId"),
    path("subnet_id", "subnetId"),
];

const DB_SYSTEM_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("availability_domain", "availabilityDomain"),
    path("shape", "shape"),
    path("cpu_core_count", "cpuCoreCount"),
    path("node_count", "nodeCount"),
    path("database_edition", "databaseEdition"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("data_storage_size_in_gbs", "dataStorageSizeInGBs"),
    path("data_storage_percentage", "dataStoragePercentage"),
    path("license_model", "licenseModel"),
    path("version", "version"),
    path("hostname", "hostname"),
    path("domain", "domain"),
    path("backup_subnet_id", "backupSubnetId"),
    path("subnet_id", "subnetId"),
    path("cluster_name", "clusterName"),
    path("listener_port", "listenerPort"),
    path("scan_dns_record_id", "scanDnsRecordId"),
    path("ssh_public_keys", "sshPublicKeys"),
    path("maintenance_window", "maintenanceWindow"),
];

const DB_NODE: &[Field] = &[
    path("id", "id"),
    path("db_system_id", "dbSystemId"),
    path("hostname", "hostname"),
    path("vnic_id", "vnicId"),
    path("lifecycle_state", "lifecycleState"),
    path("software_storage_size_in_gb", "softwareStorageSizeInGB"),
    path("time_created", "timeCreated"),
];

const DATABASE: &[Field] = &[
    path("id", "id"),
    path("db_name", "dbName"),
    path("compartment_id", "compartmentId"),
    path("character_set", "characterSet"),
    path("ncharacter_set", "ncharacterSet"),
    path("db_workload", "dbWorkload"),
    path("pdb_name", "pdbName"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("db_unique_name", "dbUniqueName"),
    path("db_system_id", "dbSystemId"),
    path("vm_cluster_id", "vmClusterId"),
    path("kms_key_id", "kmsKeyId"),
    path("vault_id", "vaultId"),
];

const DATABASE_DETAIL: &[Field] = &[
    path("id", "id"),
    path("db_name", "dbName"),
    path("compartment_id", "compartmentId"),
    path("character_set", "characterSet"),
    path("ncharacter_set", "ncharacterSet"),
    path("db_workload", "dbWorkload"),
    path("pdb_name", "pdbName"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("db_unique_name", "dbUniqueName"),
    path("db_system_id", "dbSystemId"),
    path("vm_cluster_id", "vmClusterId"),
    path("kms_key_id", "kmsKeyId"),
    path("vault_id", "vaultId"),
    path(
        "source_database_point_in_time_recovery_timestamp",
        "sourceDatabasePointInTimeRecoveryTimestamp",
    ),
];

const AUTONOMOUS_DATABASE: &[Field] = &[
    path("id", "id"),
    path("db_name", "dbName"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("cpu_core_count", "cpuCoreCount"),
    path("data_storage_size_in_tbs", "dataStorageSizeInTBs"),
    path("is_free_tier", "isFreeTier"),
    path("is_auto_scaling_enabled", "isAutoScalingEnabled"),
    path("db_workload", "dbWorkload"),
    path("db_version", "dbVersion"),
    path("license_model", "licenseModel"),
    path("is_dedicated", "isDedicated"),
    path("autonomous_container_database_id", "autonomousContainerDatabaseId"),
    path("is_access_control_enabled", "isAccessControlEnabled"),
    path("whitelisted_ips", "whitelistedIps"),
    path("are_primary_whitelisted_ips_used", "arePrimaryWhitelistedIpsUsed"),
    path("standby_whitelisted_ips", "standbyWhitelistedIps"),
    path("is_data_guard_enabled", "isDataGuardEnabled"),
    path("is_local_data_guard_enabled", "isLocalDataGuardEnabled"),
    path("subnet_id", "subnetId"),
    path("nsg_ids", "nsgIds"),
    path("private_endpoint", "privateEndpoint"),
    path("private_endpoint_label", "privateEndpointLabel"),
];

const CONNECTION_STRINGS: &[Field] = &[
    path("high", "high"),
    path("medium", "medium"),
    path("low", "low"),
    path("dedicated", "dedicated"),
];

const CONNECTION_URLS: &[Field] = &[
    path("sql_dev_web_url", "sqlDevWebUrl"),
    path("apex_url", "apexUrl"),
    path(
        "machine_learning_user_management_url",
        "machineLearningUserManagementUrl",
    ),
    path("graph_studio_url", "graphStudioUrl"),
    path("mongo_db_url", "mongoDbUrl"),
];

pub async fn list_db_systems(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.database,
        "/dbSystems",
        Query::new().with("compartmentId", compartment_id),
        DB_SYSTEM,
    )
    .await
}

pub async fn get_db_system(clients: &ClientTable, db_system_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.database,
        &format!("/dbSystems/{db_system_id}"),
        DB_SYSTEM_DETAIL,
    )
    .await
}

async fn nodes_of(
    clients: &ClientTable,
    compartment_id: &str,
    db_system_id: &str,
) -> Result<Vec<Value>, ToolError> {
    Ok(clients
        .database
        .list_all(
            "/dbNodes",
            Query::new()
                .with("compartmentId", compartment_id)
                .with("dbSystemId", db_system_id),
        )
        .await?)
}

/// Nodes of one DB system, or of every DB system in the compartment.
pub async fn list_db_nodes(
    clients: &ClientTable,
    compartment_id: &str,
    db_system_id: Option<&str>,
) -> Result<Value, ToolError> {
    let systems = match db_system_id {
        Some(id) => vec![id.to_string()],
        None => clients
            .database
            .list_all("/dbSystems", Query::new().with("compartmentId", compartment_id))
            .await?
            .iter()
            .filter_map(|s| lookup_str(s, "id").map(str::to_string))
            .collect(),
    };

    let mut nodes = Vec::new();
    for system in &systems {
        nodes.extend(nodes_of(clients, compartment_id, system).await?);
    }
    Ok(project_all(&nodes, DB_NODE))
}

pub async fn get_db_node(clients: &ClientTable, db_node_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.database, &format!("/dbNodes/{db_node_id}"), DB_NODE).await
}

async fn node_state(clients: &ClientTable, db_node_id: &str) -> Result<Value, ToolError> {
    require_ocid("db_node_id", db_node_id)?;
    Ok(clients
        .database
        .get(&format!("/dbNodes/{db_node_id}"), Query::new())
        .await?)
}

fn current_state(node: &Value) -> &str {
    lookup_str(node, "lifecycleState").unwrap_or_default()
}

fn rejected(verb: &str, current: &str) -> Value {
    json!({
        "success": false,
        "message": format!("Cannot {verb} DB node from state {current}"),
        "current_state": current,
    })
}

/// Issue a node action and wait (bounded) for `target`.
async fn act_and_wait(
    clients: &ClientTable,
    db_node_id: &str,
    action: &str,
    target: &'static str,
    verb: &str,
    policy: &PollPolicy,
) -> Result<Value, ToolError> {
    clients
        .database
        .action(&format!("/dbNodes/{db_node_id}"), action)
        .await?;
    tracing::info!(db_node_id, action, "Issued DB node action");

    let outcome = poll_until(
        policy,
        || node_state(clients, db_node_id),
        |node| current_state(node) == target,
    )
    .await?;

    Ok(match outcome {
        PollOutcome::Reached(node) => json!({
            "success": true,
            "message": format!("DB Node {db_node_id} {verb} requested successfully"),
            "current_state": current_state(&node),
        }),
        PollOutcome::InProgress(node) => {
            tracing::info!(db_node_id, state = current_state(&node), "DB node still in transition");
            json!({
                "success": true,
                "message": format!("DB Node {db_node_id} {verb} in progress"),
                "current_state": current_state(&node),
            })
        }
    })
}

pub async fn start_db_node(
    clients: &ClientTable,
    db_node_id: &str,
    policy: &PollPolicy,
) -> Result<Value, ToolError> {
    let node = node_state(clients, db_node_id).await?;
    match current_state(&node) {
        state::AVAILABLE => Ok(json!({
            "success": true,
            "message": format!("DB Node {db_node_id} is already available"),
            "current_state": state::AVAILABLE,
        })),
        state::STOPPED => {
            act_and_wait(clients, db_node_id, "START", state::AVAILABLE, "start", policy).await
        }
        other => Ok(rejected("start", other)),
    }
}

/// Stop a node; `soft` shuts the database down gracefully first.
pub async fn stop_db_node(
    clients: &ClientTable,
    db_node_id: &str,
    soft: bool,
    policy: &PollPolicy,
) -> Result<Value, ToolError> {
    let node = node_state(clients, db_node_id).await?;
    match current_state(&node) {
        state::STOPPED => Ok(json!({
            "success": true,
            "message": format!("DB Node {db_node_id} is already stopped"),
            "current_state": state::STOPPED,
        })),
        state::AVAILABLE => {
            let action = if soft { "SOFTSTOP" } else { "STOP" };
            act_and_wait(clients, db_node_id, action, state::STOPPED, "stop", policy).await
        }
        other => Ok(rejected("stop", other)),
    }
}

/// Restart-style actions. Only valid on an AVAILABLE node; they return as
/// soon as the action is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRestart {
    Reboot,
    Reset,
    SoftReset,
}

impl NodeRestart {
    fn action(self) -> &'static str {
        match self {
            Self::Reboot | Self::SoftReset => "SOFTRESET",
            Self::Reset => "RESET",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Reboot => "reboot",
            Self::Reset => "reset",
            Self::SoftReset => "soft reset",
        }
    }
}

pub async fn restart_db_node(
    clients: &ClientTable,
    db_node_id: &str,
    kind: NodeRestart,
) -> Result<Value, ToolError> {
    let node = node_state(clients, db_node_id).await?;
    let current = current_state(&node);
    if current != state::AVAILABLE {
        return Ok(rejected(kind.verb(), current));
    }

    let updated = clients
        .database
        .action(&format!("/dbNodes/{db_node_id}"), kind.action())
        .await?;
    tracing::info!(db_node_id, action = kind.action(), "Issued DB node action");

    Ok(json!({
        "success": true,
        "message": format!("DB Node {db_node_id} {} requested successfully", kind.verb()),
        "current_state": lookup_str(&updated, "lifecycleState").unwrap_or(current),
    }))
}

/// Start or stop every node of a DB system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPower {
    Start,
    Stop { soft: bool },
}

pub async fn power_db_system(
    clients: &ClientTable,
    db_system_id: &str,
    compartment_id: &str,
    power: SystemPower,
    policy: &PollPolicy,
) -> Result<Value, ToolError> {
    let nodes = nodes_of(clients, compartment_id, db_system_id).await?;
    if nodes.is_empty() {
        return Ok(json!({
            "success": false,
            "message": format!("No DB Nodes found for DB System {db_system_id}"),
        }));
    }

    let (verb, noun) = match power {
        SystemPower::Start => ("starting", "Start"),
        SystemPower::Stop { .. } => ("stopping", "Stop"),
    };

    let mut results = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let node_id = lookup_str(node, "id").unwrap_or_default();
        let outcome = match power {
            SystemPower::Start => start_db_node(clients, node_id, policy).await,
            SystemPower::Stop { soft } => stop_db_node(clients, node_id, soft, policy).await,
        };
        let mut entry = json!({"db_node_id": node_id});
        match outcome {
            Ok(Value::Object(fields)) => {
                if let Value::Object(map) = &mut entry {
                    map.extend(fields);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(db_node_id = node_id, error = %e, "DB node action failed");
                entry["success"] = json!(false);
                entry["message"] = json!(format!("Error {verb} node: {e}"));
            }
        }
        results.push(entry);
    }

    Ok(json!({
        "success": true,
        "message": format!("{noun} requested for {} DB Nodes", nodes.len()),
        "results": results,
    }))
}

pub async fn list_databases(
    clients: &ClientTable,
    compartment_id: &str,
    db_system_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.database,
        "/databases",
        Query::new()
            .with("compartmentId", compartment_id)
            .with_opt("systemId", db_system_id),
        DATABASE,
    )
    .await
}

pub async fn get_database(clients: &ClientTable, database_id: &str) -> Result<Value, ToolError> {
    fetch_one(
        &clients.database,
        &format!("/databases/{database_id}"),
        DATABASE_DETAIL,
    )
    .await
}

pub async fn list_autonomous_databases(
    clients: &ClientTable,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.database,
        "/autonomousDatabases",
        Query::new().with("compartmentId", compartment_id),
        AUTONOMOUS_DATABASE,
    )
    .await
}

/// Autonomous database with its connection strings and tool URLs.
pub async fn get_autonomous_database(
    clients: &ClientTable,
    autonomous_database_id: &str,
) -> Result<Value, ToolError> {
    let adb = clients
        .database
        .get(
            &format!("/autonomousDatabases/{autonomous_database_id}"),
            Query::new(),
        )
        .await?;

    let nested = |key: &str, fields: &[Field]| match adb.get(key) {
        Some(value) if value.is_object() => project(value, fields),
        _ => Value::Null,
    };
    let connection_strings = nested("connectionStrings", CONNECTION_STRINGS);
    let connection_urls = nested("connectionUrls", CONNECTION_URLS);

    let mut record = project(&adb, AUTONOMOUS_DATABASE);
    if let Value::Object(map) = &mut record {
        map.insert("connection_strings".to_string(), connection_strings);
        map.insert("connection_urls".to_string(), connection_urls);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_table;
    use oci_mcp_client::Method;
    use std::time::Duration;

    const NODE: &str = "/dbNodes/ocid1.dbnode.oc1..n1";

    fn fast() -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            multiplier: 2.0,
            timeout: Duration::from_millis(10),
        }
    }

    fn node(state: &str) -> Value {
        json!({"id": "ocid1.dbnode.oc1..n1", "dbSystemId": "sys", "lifecycleState": state})
    }

    #[tokio::test]
    async fn test_start_waits_for_available() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("STOPPED"));
        mock.on(Method::Get, NODE, node("STARTING"));
        mock.on(Method::Get, NODE, node("AVAILABLE"));
        mock.on(Method::Post, NODE, node("STARTING"));

        let result = start_db_node(&clients, "ocid1.dbnode.oc1..n1", &fast()).await.unwrap();
        assert_eq!(
            result,
            json!({
                "success": true,
                "message": "DB Node ocid1.dbnode.oc1..n1 start requested successfully",
                "current_state": "AVAILABLE",
            })
        );
        let action = &mock.calls_to(Method::Post, NODE)[0];
        assert_eq!(action.query.get("action"), Some("START"));
    }

    #[tokio::test]
    async fn test_start_reports_in_progress_when_budget_runs_out() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("STOPPED"));
        mock.on(Method::Get, NODE, node("STARTING"));
        mock.on(Method::Post, NODE, node("STARTING"));

        let result = start_db_node(&clients, "ocid1.dbnode.oc1..n1", &fast()).await.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "DB Node ocid1.dbnode.oc1..n1 start in progress");
        assert_eq!(result["current_state"], "STARTING");
    }

    #[tokio::test]
    async fn test_start_available_node_is_noop() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("AVAILABLE"));

        let result = start_db_node(&clients, "ocid1.dbnode.oc1..n1", &fast()).await.unwrap();
        assert_eq!(result["success"], true);
        assert!(mock.calls_to(Method::Post, NODE).is_empty());
    }

    #[tokio::test]
    async fn test_stop_from_provisioning_is_rejected() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("PROVISIONING"));

        let result = stop_db_node(&clients, "ocid1.dbnode.oc1..n1", true, &fast()).await.unwrap();
        assert_eq!(
            result,
            json!({
                "success": false,
                "message": "Cannot stop DB node from state PROVISIONING",
                "current_state": "PROVISIONING",
            })
        );
    }

    #[tokio::test]
    async fn test_hard_stop_uses_stop_action() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("AVAILABLE"));
        mock.on(Method::Get, NODE, node("STOPPED"));
        mock.on(Method::Post, NODE, node("STOPPING"));

        let result = stop_db_node(&clients, "ocid1.dbnode.oc1..n1", false, &fast()).await.unwrap();
        assert_eq!(result["current_state"], "STOPPED");
        let action = &mock.calls_to(Method::Post, NODE)[0];
        assert_eq!(action.query.get("action"), Some("STOP"));
    }

    #[tokio::test]
    async fn test_reboot_maps_to_softreset() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("AVAILABLE"));
        mock.on(Method::Post, NODE, node("UPDATING"));

        let result = restart_db_node(&clients, "ocid1.dbnode.oc1..n1", NodeRestart::Reboot).await.unwrap();
        assert_eq!(result["message"], "DB Node ocid1.dbnode.oc1..n1 reboot requested successfully");
        assert_eq!(result["current_state"], "UPDATING");
        let action = &mock.calls_to(Method::Post, NODE)[0];
        assert_eq!(action.query.get("action"), Some("SOFTRESET"));
    }

    #[tokio::test]
    async fn test_reset_requires_available() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, NODE, node("STOPPED"));

        let result = restart_db_node(&clients, "ocid1.dbnode.oc1..n1", NodeRestart::Reset).await.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Cannot reset DB node from state STOPPED");
    }

    #[tokio::test]
    async fn test_malformed_node_id_is_refused_before_any_call() {
        let (mock, clients) = mock_table();

        let err = stop_db_node(&clients, "x/../../dbSystems/ocid1.dbsystem.oc1..s", true, &fast())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_system_without_nodes() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/dbNodes", json!([]));

        let result = power_db_system(&clients, "sys", "c", SystemPower::Start, &fast())
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({"success": false, "message": "No DB Nodes found for DB System sys"})
        );
    }

    #[tokio::test]
    async fn test_stop_system_captures_per_node_faults() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/dbNodes", json!([{"id": "ocid1.dbnode.oc1..n1"}, {"id": "ocid1.dbnode.oc1..n2"}]));
        mock.on(Method::Get, NODE, node("STOPPED"));
        mock.on_error(Method::Get, "/dbNodes/ocid1.dbnode.oc1..n2", 500, "InternalError", "boom");

        let result = power_db_system(
            &clients,
            "sys",
            "c",
            SystemPower::Stop { soft: true },
            &fast(),
        )
        .await
        .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "Stop requested for 2 DB Nodes");
        assert_eq!(result["results"][0]["db_node_id"], "ocid1.dbnode.oc1..n1");
        assert_eq!(result["results"][0]["success"], true);
        assert_eq!(result["results"][1]["db_node_id"], "ocid1.dbnode.oc1..n2");
        assert_eq!(result["results"][1]["success"], false);
        assert!(
            result["results"][1]["message"]
                .as_str()
                .unwrap()
                .starts_with("Error stopping node: ")
        );
    }

    #[tokio::test]
    async fn test_list_db_nodes_across_systems() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/dbSystems", json!([{"id": "s1"}, {"id": "s2"}]));
        mock.on(Method::Get, "/dbNodes", json!([{"id": "n1", "dbSystemId": "s1"}]));
        mock.on(Method::Get, "/dbNodes", json!([{"id": "n2", "dbSystemId": "s2"}]));

        let nodes = list_db_nodes(&clients, "c", None).await.unwrap();
        assert_eq!(nodes[0]["id"], "n1");
        assert_eq!(nodes[1]["db_system_id"], "s2");
    }

    #[tokio::test]
    async fn test_autonomous_database_connection_details() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/autonomousDatabases/adb1",
            json!({
                "id": "adb1",
                "isFreeTier": true,
                "connectionStrings": {"high": "h", "low": "l", "allConnectionStrings": {"HIGH": "h"}},
            }),
        );

        let adb = get_autonomous_database(&clients, "adb1").await.unwrap();
        assert_eq!(adb["is_free_tier"], true);
        assert_eq!(
            adb["connection_strings"],
            json!({"high": "h", "medium": null, "low": "l", "dedicated": null})
        );
        assert!(adb["connection_urls"].is_null());
    }
}
