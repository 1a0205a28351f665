//! Identity and access management: users, groups, policies, dynamic groups.

use crate::error::ToolError;
use crate::projection::{Field, path, verbatim};
use crate::{fetch_all, fetch_one};
use oci_mcp_client::{ClientTable, Query};
use serde_json::Value;

const USER: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("email", "email"),
    path("email_verified", "emailVerified"),
    path("is_mfa_activated", "isMfaActivated"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
    path("capabilities", "capabilities"),
];

const GROUP: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
];

const POLICY: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    verbatim("statements", "statements"),
    path("version_date", "versionDate"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
];

const DYNAMIC_GROUP: &[Field] = &[
    path("id", "id"),
    path("name", "name"),
    path("description", "description"),
    path("matching_rule", "matchingRule"),
    path("lifecycle_state", "lifecycleState"),
    path("time_created", "timeCreated"),
    path("compartment_id", "compartmentId"),
];

fn in_compartment(compartment_id: &str) -> Query {
    Query::new().with("compartmentId", compartment_id)
}

pub async fn list_users(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(&clients.identity, "/users", in_compartment(compartment_id), USER).await
}

pub async fn get_user(clients: &ClientTable, user_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.identity, &format!("/users/{user_id}"), USER).await
}

pub async fn list_groups(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(&clients.identity, "/groups", in_compartment(compartment_id), GROUP).await
}

pub async fn get_group(clients: &ClientTable, group_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.identity, &format!("/groups/{group_id}"), GROUP).await
}

pub async fn list_policies(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    fetch_all(&clients.identity, "/policies", in_compartment(compartment_id), POLICY).await
}

pub async fn get_policy(clients: &ClientTable, policy_id: &str) -> Result<Value, ToolError> {
    fetch_one(&clients.identity, &format!("/policies/{policy_id}"), POLICY).await
}

pub async fn list_dynamic_groups(
    clients: &ClientTable,
    compartment_id: &str,
) -> Result<Value, ToolError> {
    fetch_all(
        &clients.identity,
        "/dynamicGroups",
        in_compartment(compartment_id),
        DYNAMIC_GROUP,
    )
    .await
}

pub async fn get_dynamic_group(
    clients: &ClientTable,
    dynamic_group_id: &str,
) -> Result<Value, ToolError> {
    fetch_one(
        &clients.identity,
        &format!("/dynamicGroups/{dynamic_group_id}"),
        DYNAMIC_GROUP,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_table, table_with};
    use oci_mcp_client::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_users_flattens_capabilities() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/users",
            json!([{
                "id": "ocid1.user.oc1..a",
                "name": "alice",
                "emailVerified": true,
                "lifecycleState": "ACTIVE",
                "capabilities": {"canUseApiKeys": true, "canUseConsolePassword": false}
            }]),
        );

        let users = list_users(&clients, "ocid1.tenancy").await.unwrap();
        assert_eq!(users[0]["name"], "alice");
        assert_eq!(users[0]["email_verified"], true);
        assert_eq!(users[0]["capabilities"]["can_use_api_keys"], true);
        assert!(users[0]["email"].is_null());
        assert_eq!(
            mock.calls()[0].query.get("compartmentId"),
            Some("ocid1.tenancy")
        );
    }

    #[tokio::test]
    async fn test_get_policy_keeps_statements() {
        let clients = table_with(|mock| {
            mock.on(
                Method::Get,
                "/policies/p1",
                json!({"id": "p1", "statements": ["Allow group Admins to manage all-resources in tenancy"]}),
            );
        });

        let policy = get_policy(&clients, "p1").await.unwrap();
        assert_eq!(
            policy["statements"][0],
            "Allow group Admins to manage all-resources in tenancy"
        );
    }

    #[tokio::test]
    async fn test_get_group_propagates_not_found() {
        let (_mock, clients) = mock_table();
        let err = get_group(&clients, "missing").await.unwrap_err();
        assert!(err.to_string().contains("NotAuthorizedOrNotFound"));
    }
}
