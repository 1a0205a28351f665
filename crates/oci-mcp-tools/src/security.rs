//! Security lists, network security groups, vaults and keys.

use crate::error::ToolError;
use crate::projection::{Field, count, path, project, project_all};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::Value;

const SECURITY_LIST: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("vcn_id", "vcnId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    count("ingress_security_rules_count", "ingressSecurityRules"),
    count("egress_security_rules_count", "egressSecurityRules"),
];

const SECURITY_LIST_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("vcn_id", "vcnId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("ingress_security_rules", "ingressSecurityRules"),
    path("egress_security_rules", "egressSecurityRules"),
];

const NSG: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("vcn_id", "vcnId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
];

const NSG_RULE: &[Field] = &[
    path("id", "id"),
    path("direction", "direction"),
    path("protocol", "protocol"),
    path("source", "source"),
    path("source_type", "sourceType"),
    path("destination", "destination"),
    path("destination_type", "destinationType"),
    path("is_stateless", "isStateless"),
    path("description", "description"),
    path("tcp_options", "tcpOptions"),
    path("udp_options", "udpOptions"),
    path("icmp_options", "icmpOptions"),
];

const VAULT: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("vault_type", "vaultType"),
    path("crypto_endpoint", "cryptoEndpoint"),
    path("management_endpoint", "managementEndpoint"),
    path("is_primary", "isPrimary"),
];

const VAULT_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("vault_type", "vaultType"),
    path("crypto_endpoint", "cryptoEndpoint"),
    path("management_endpoint", "managementEndpoint"),
    path("is_primary", "isPrimary"),
    path("replica_details", "replicaDetails"),
];

const KEY: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("vault_id", "vaultId"),
    path("protection_mode", "protectionMode"),
    path("algorithm", "algorithm"),
];

const KEY_DETAIL: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("compartment_id", "compartmentId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("vault_id", "vaultId"),
    path("protection_mode", "protectionMode"),
    path("algorithm", "keyShape.algorithm"),
    path("current_key_version", "currentKeyVersion"),
    path("key_shape", "keyShape"),
    path("is_primary", "isPrimary"),
    path("replica_details", "replicaDetails"),
];

pub async fn list_security_lists(
    clients: &ClientTable,
    compartment_id: &str,
    vcn_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.network,
        "/securityLists",
        Query::new()
            .with("compartmentId", compartment_id)
            .with_opt("vcnId", vcn_id),
        SECURITY_LIST,
    )
    .await
}

/// Security list with its full ingress and egress rules.
pub async fn get_security_list(
    clients: &ClientTable,
    security_list_id: &str,
) -> Result<Value, ToolError> {
    fetch_one(
        &clients.network,
        &format!("/securityLists/{security_list_id}"),
        SECURITY_LIST_DETAIL,
    )
    .await
}

pub async fn list_network_security_groups(
    clients: &ClientTable,
    compartment_id: &str,
    vcn_id: Option<&str>,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.network,
        "/networkSecurityGroups",
        Query::new()
            .with("compartmentId", compartment_id)
            .with_opt("vcnId", vcn_id),
        NSG,
    )
    .await
}

/// Network security group and its rules.
pub async fn get_network_security_group(
    clients: &ClientTable,
    nsg_id: &str,
) -> Result<Value, ToolError> {
    let nsg = clients
        .network
        .get(&format!("/networkSecurityGroups/{nsg_id}"), Query::new())
        .await?;
    let rules = clients
        .network
        .list_all(
            &format!("/networkSecurityGroups/{nsg_id}/securityRules"),
            Query::new(),
        )
        .await?;

    let mut record = project(&nsg, NSG);
    if let Value::Object(map) = &mut record {
        map.insert("security_rules".to_string(), project_all(&rules, NSG_RULE));
    }
    Ok(record)
}

pub async fn list_vaults(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.kms_vault,
        "/vaults",
        Query::new().with("compartmentId", compartment_id),
        VAULT,
    )
    .await
}

pub async fn get_vault(clients: &ClientTable, vault_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.kms_vault, &format!("/vaults/{vault_id}"), VAULT_DETAIL).await
}

/// Keys live behind the vault's own management endpoint.
pub async fn list_keys(
    clients: &ClientTable,
    management_endpoint: &str,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.kms_management(management_endpoint),
        "/keys",
        Query::new().with("compartmentId", compartment_id),
        KEY,
    )
    .await
}

pub async fn get_key(
    clients: &ClientTable,
    management_endpoint: &str,
    key_id: &str,
) -> Result<Value, ToolError> {
    fetch_one(
        &clients.kms_management(management_endpoint),
        &format!("/keys/{key_id}"),
        KEY_DETAIL,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_table;
    use oci_mcp_client::{Method, Service};
    use serde_json::json;

    #[tokio::test]
    async fn test_security_list_rule_counts() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/securityLists",
            json!([{"id": "sl1", "ingressSecurityRules": [{}, {}, {}], "egressSecurityRules": [{}]}]),
        );

        let lists = list_security_lists(&clients, "c", None).await.unwrap();
        assert_eq!(lists[0]["ingress_security_rules_count"], 3);
        assert_eq!(lists[0]["egress_security_rules_count"], 1);
        assert!(mock.calls()[0].query.get("vcnId").is_none());
    }

    #[tokio::test]
    async fn test_security_list_rules_are_snake_cased() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/securityLists/sl1",
            json!({
                "id": "sl1",
                "ingressSecurityRules": [{
                    "protocol": "6",
                    "source": "0.0.0.0/0",
                    "isStateless": false,
                    "tcpOptions": {"destinationPortRange": {"min": 22, "max": 22}}
                }]
            }),
        );

        let list = get_security_list(&clients, "sl1").await.unwrap();
        let rule = &list["ingress_security_rules"][0];
        assert_eq!(rule["is_stateless"], false);
        assert_eq!(rule["tcp_options"]["destination_port_range"]["min"], 22);
    }

    #[tokio::test]
    async fn test_nsg_includes_rules() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/networkSecurityGroups/nsg1", json!({"id": "nsg1"}));
        mock.on(
            Method::Get,
            "/networkSecurityGroups/nsg1/securityRules",
            json!([{"id": "r1", "direction": "INGRESS", "protocol": "all"}]),
        );

        let nsg = get_network_security_group(&clients, "nsg1").await.unwrap();
        assert_eq!(nsg["security_rules"][0]["direction"], "INGRESS");
    }

    #[tokio::test]
    async fn test_keys_use_management_endpoint() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/keys", json!([{"id": "k1", "protectionMode": "HSM"}]));

        let keys = list_keys(&clients, "https://abc-management.kms.us-ashburn-1.oraclecloud.com", "c")
            .await
            .unwrap();
        assert_eq!(keys[0]["protection_mode"], "HSM");

        let call = &mock.calls()[0];
        assert_eq!(call.service, Service::KmsManagement);
        assert_eq!(
            call.endpoint.as_deref(),
            Some("https://abc-management.kms.us-ashburn-1.oraclecloud.com")
        );
    }

    #[tokio::test]
    async fn test_key_shape() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/keys/k1",
            json!({"id": "k1", "keyShape": {"algorithm": "AES", "length": 32, "curveId": null}}),
        );

        let key = get_key(&clients, "https://mgmt", "k1").await.unwrap();
        assert_eq!(key["algorithm"], "AES");
        assert_eq!(key["key_shape"]["length"], 32);
        assert!(key["key_shape"]["curve_id"].is_null());
    }
}
