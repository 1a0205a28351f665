//! Virtual cloud networks, subnets and VNICs.

use crate::error::ToolError;
use crate::projection::{Field, lookup_str, path, project, project_all};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::{Map, Value, json};

const VCN: &[Field] = &[
    path("id", "id"),
    path("name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("cidr_block", "cidrBlock"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
    path("dns_label", "dnsLabel"),
    path("default_dhcp_options_id", "defaultDhcpOptionsId"),
    path("default_route_table_id", "defaultRouteTableId"),
    path("default_security_list_id", "defaultSecurityListId"),
];

const VCN_DETAIL: &[Field] = &[
    path("id", "id"),
    path("name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("cidr_block", "cidrBlock"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
    path("dns_label", "dnsLabel"),
    path("default_dhcp_options_id", "defaultDhcpOptionsId"),
    path("default_route_table_id", "defaultRouteTableId"),
    path("default_security_list_id", "defaultSecurityListId"),
    path("ipv6_cidr_blocks", "ipv6CidrBlocks"),
];

const SUBNET: &[Field] = &[
    path("id", "id"),
    path("name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("cidr_block", "cidrBlock"),
    path("availability_domain", "availabilityDomain"),
    path("compartment_id", "compartmentId"),
    path("vcn_id", "vcnId"),
    path("route_table_id", "routeTableId"),
    path("dhcp_options_id", "dhcpOptionsId"),
    path("security_list_ids", "securityListIds"),
    path("time_created", "timeCreated"),
    path("prohibit_public_ip_on_vnic", "prohibitPublicIpOnVnic"),
    path("ipv6_cidr_block", "ipv6CidrBlock"),
];

const VNIC: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("hostname_label", "hostnameLabel"),
    path("is_primary", "isPrimary"),
    path("lifecycle_state", "lifecycleState"),
    path("mac_address", "macAddress"),
    path("private_ip", "privateIp"),
    path("public_ip", "publicIp"),
    path("subnet_id", "subnetId"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
    path("ipv6_addresses", "ipv6Addresses"),
];

/// What is still known about an attachment whose VNIC could not be read.
const UNREADABLE_ATTACHMENT: &[Field] = &[
    path("attachment_id", "id"),
    path("vnic_id", "vnicId"),
    path("instance_id", "instanceId"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
];

pub async fn list_vcns(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(
        &clients.network,
        "/vcns",
        Query::new().with("compartmentId", compartment_id),
        VCN,
    )
    .await
}

pub async fn get_vcn(clients: &ClientTable, vcn_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.network, &format!("/vcns/{vcn_id}"), VCN_DETAIL).await
}

/// Subnets of one VCN, or of every VCN in the compartment.
pub async fn list_subnets(
    clients: &ClientTable,
    compartment_id: &str,
    vcn_id: Option<&str>,
) -> Result<Value, ToolError> {
    let vcn_ids = match vcn_id {
        Some(id) => vec![id.to_string()],
        None => clients
            .network
            .list_all("/vcns", Query::new().with("compartmentId", compartment_id))
            .await?
            .iter()
            .filter_map(|vcn| lookup_str(vcn, "id").map(str::to_string))
            .collect(),
    };

    let mut subnets = Vec::new();
    for vcn in &vcn_ids {
        let page = clients
            .network
            .list_all(
                "/subnets",
                Query::new()
                    .with("compartmentId", compartment_id)
                    .with("vcnId", vcn.as_str()),
            )
            .await?;
        subnets.extend(page);
    }

    tracing::info!(compartment_id, vcns = vcn_ids.len(), count = subnets.len(), "Found subnets");
    Ok(project_all(&subnets, SUBNET))
}

pub async fn get_subnet(clients: &ClientTable, subnet_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.network, &format!("/subnets/{subnet_id}"), SUBNET).await
}

/// VNICs attached in a compartment, optionally limited to one instance.
///
/// Each VNIC is looked up individually; one that cannot be read is reported
/// with its attachment data and a `vnic_error` message instead of failing the
/// whole listing.
pub async fn list_vnics(
    clients: &ClientTable,
    compartment_id: &str,
    instance_id: Option<&str>,
) -> Result<Value, ToolError> {
    let attachments = clients
        .compute
        .list_all(
            "/vnicAttachments",
            Query::new()
                .with("compartmentId", compartment_id)
                .with_opt("instanceId", instance_id),
        )
        .await?;

    let mut vnics = Vec::with_capacity(attachments.len());
    for attachment in &attachments {
        let vnic_id = lookup_str(attachment, "vnicId").unwrap_or_default();
        match clients
            .network
            .get(&format!("/vnics/{vnic_id}"), Query::new())
            .await
        {
            Ok(vnic) => {
                let mut record = project(&vnic, VNIC);
                if let Value::Object(map) = &mut record {
                    map.insert("attachment_id".to_string(), json!(lookup_str(attachment, "id")));
                    map.insert(
                        "instance_id".to_string(),
                        json!(lookup_str(attachment, "instanceId")),
                    );
                    map.insert(
                        "attachment_lifecycle_state".to_string(),
                        json!(lookup_str(attachment, "lifecycleState")),
                    );
                }
                vnics.push(record);
            }
            Err(e) => {
                tracing::warn!(vnic_id, error = %e, "Could not get VNIC details");
                let mut record = match project(attachment, UNREADABLE_ATTACHMENT) {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                record.insert("vnic_error".to_string(), json!(e.to_string()));
                vnics.push(Value::Object(record));
            }
        }
    }

    Ok(Value::Array(vnics))
}

pub async fn get_vnic(clients: &ClientTable, vnic_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.network, &format!("/vnics/{vnic_id}"), VNIC).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_table;
    use oci_mcp_client::Method;

    #[tokio::test]
    async fn test_get_vcn_has_ipv6_blocks() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/vcns/v1",
            json!({"id": "v1", "displayName": "prod", "cidrBlock": "10.0.0.0/16"}),
        );

        let vcn = get_vcn(&clients, "v1").await.unwrap();
        assert_eq!(vcn["name"], "prod");
        assert_eq!(vcn["cidr_block"], "10.0.0.0/16");
        assert!(vcn["ipv6_cidr_blocks"].is_null());
    }

    #[tokio::test]
    async fn test_list_subnets_walks_every_vcn() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/vcns", json!([{"id": "v1"}, {"id": "v2"}]));
        mock.on(Method::Get, "/subnets", json!([{"id": "s1"}]));
        mock.on(Method::Get, "/subnets", json!([{"id": "s2"}]));

        let subnets = list_subnets(&clients, "c", None).await.unwrap();
        assert_eq!(subnets, json!([
            project(&json!({"id": "s1"}), SUBNET),
            project(&json!({"id": "s2"}), SUBNET),
        ]));

        let vcn_filters: Vec<_> = mock
            .calls_to(Method::Get, "/subnets")
            .iter()
            .map(|c| c.query.get("vcnId").unwrap_or_default().to_string())
            .collect();
        assert_eq!(vcn_filters, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_list_subnets_for_one_vcn() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/subnets", json!([{"id": "s1", "securityListIds": ["sl1"]}]));

        let subnets = list_subnets(&clients, "c", Some("v9")).await.unwrap();
        assert_eq!(subnets[0]["security_list_ids"], json!(["sl1"]));
        assert!(mock.calls_to(Method::Get, "/vcns").is_empty());
    }

    #[tokio::test]
    async fn test_list_vnics_reports_unreadable_vnic_inline() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/vnicAttachments",
            json!([
                {"id": "a1", "vnicId": "n1", "instanceId": "i1", "lifecycleState": "ATTACHED"},
                {"id": "a2", "vnicId": "n2", "instanceId": "i1", "lifecycleState": "ATTACHED"}
            ]),
        );
        mock.on(
            Method::Get,
            "/vnics/n1",
            json!({"id": "n1", "privateIp": "10.0.0.5", "isPrimary": true}),
        );
        mock.on_error(Method::Get, "/vnics/n2", 404, "NotAuthorizedOrNotFound", "gone");

        let vnics = list_vnics(&clients, "c", Some("i1")).await.unwrap();
        assert_eq!(vnics[0]["private_ip"], "10.0.0.5");
        assert_eq!(vnics[0]["attachment_id"], "a1");
        assert_eq!(vnics[0]["attachment_lifecycle_state"], "ATTACHED");

        assert_eq!(vnics[1]["vnic_id"], "n2");
        assert_eq!(vnics[1]["attachment_id"], "a2");
        assert!(vnics[1]["vnic_error"].as_str().unwrap().contains("gone"));
        assert!(vnics[1].get("error").is_none());

        let call = &mock.calls_to(Method::Get, "/vnicAttachments")[0];
        assert_eq!(call.query.get("instanceId"), Some("i1"));
    }
}
