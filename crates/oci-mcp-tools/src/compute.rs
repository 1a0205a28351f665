//! Compute instances.

use crate::cloud_init;
use crate::error::ToolError;
use crate::{fetch_all, require_ocid};
use crate::projection::{Field, equals, lookup_str, path, project, verbatim};
use oci_mcp_client::{ClientTable, Query};
use oci_mcp_core::state::instance as state;
use serde_json::{Map, Value, json};

const INSTANCE: &[Field] = &[
    path("id", "id"),
    path("name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("shape", "shape"),
    path("time_created", "timeCreated"),
    path("availability_domain", "availabilityDomain"),
    path("compartment_id", "compartmentId"),
    path("fault_domain", "faultDomain"),
    equals("is_running", "lifecycleState", state::RUNNING),
    path("ocpu_count", "shapeConfig.ocpus"),
    path("memory_in_gbs", "shapeConfig.memoryInGBs"),
];

const INSTANCE_DETAIL: &[Field] = &[
    path("id", "id"),
    path("name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("shape", "shape"),
    path("time_created", "timeCreated"),
    path("availability_domain", "availabilityDomain"),
    path("compartment_id", "compartmentId"),
    path("fault_domain", "faultDomain"),
    equals("is_running", "lifecycleState", state::RUNNING),
    verbatim("metadata", "metadata"),
    path("ocpu_count", "shapeConfig.ocpus"),
    path("memory_in_gbs", "shapeConfig.memoryInGBs"),
    path("processors", "shapeConfig.processors"),
];

const VNIC_ATTACHMENT: &[Field] = &[
    path("id", "id"),
    path("display_name", "displayName"),
    path("lifecycle_state", "lifecycleState"),
    path("vnic_id", "vnicId"),
];

pub async fn list_instances(clients: &ClientTable, compartment_id: &str) -> Result<Value, ToolError> {
    let instances = fetch_all(
        &clients.compute,
        "/instances",
        Query::new().with("compartmentId", compartment_id),
        INSTANCE,
    )
    .await?;
    tracing::info!(
        compartment_id,
        count = instances.as_array().map_or(0, Vec::len),
        "Found instances"
    );
    Ok(instances)
}

/// Instance details including its VNIC attachments.
pub async fn get_instance(clients: &ClientTable, instance_id: &str) -> Result<Value, ToolError> {
    let instance = fetch_instance(clients, instance_id).await?;
    let compartment_id = lookup_str(&instance, "compartmentId").unwrap_or_default();

    let attachments = fetch_all(
        &clients.compute,
        "/vnicAttachments",
        Query::new()
            .with("compartmentId", compartment_id)
            .with("instanceId", instance_id),
        VNIC_ATTACHMENT,
    )
    .await?;

    let mut record = project(&instance, INSTANCE_DETAIL);
    if let Value::Object(map) = &mut record {
        map.insert("vnic_attachments".to_string(), attachments);
    }
    Ok(record)
}

async fn fetch_instance(clients: &ClientTable, instance_id: &str) -> Result<Value, ToolError> {
    require_ocid("instance_id", instance_id)?;
    Ok(clients
        .compute
        .get(&format!("/instances/{instance_id}"), Query::new())
        .await?)
}

fn display(instance: &Value, instance_id: &str) -> String {
    match lookup_str(instance, "displayName") {
        Some(name) => format!("{name} ({instance_id})"),
        None => instance_id.to_string(),
    }
}

fn rejected(verb: &str, current: &str) -> Value {
    json!({
        "success": false,
        "message": format!("Cannot {verb} instance from state {current}"),
        "current_state": current,
    })
}

/// Request a start. Returns as soon as the action is accepted.
pub async fn start_instance(clients: &ClientTable, instance_id: &str) -> Result<Value, ToolError> {
    let instance = fetch_instance(clients, instance_id).await?;
    let current = lookup_str(&instance, "lifecycleState").unwrap_or_default();

    if current == state::RUNNING {
        return Ok(json!({
            "success": true,
            "already_running": true,
            "message": format!("Instance {} is already running", display(&instance, instance_id)),
            "current_state": current,
        }));
    }
    if current != state::STOPPED {
        return Ok(rejected("start", current));
    }

    let updated = clients
        .compute
        .action(&format!("/instances/{instance_id}"), "START")
        .await?;
    tracing::info!(instance_id, "Initiated START");

    Ok(json!({
        "success": true,
        "message": format!(
            "Instance {} is starting. Check status later.",
            display(&instance, instance_id)
        ),
        "current_state": lookup_str(&updated, "lifecycleState").unwrap_or(state::STARTING),
        "instance_id": instance_id,
    }))
}

/// Request a graceful (`SOFTSTOP`) or forced (`STOP`) shutdown.
pub async fn stop_instance(
    clients: &ClientTable,
    instance_id: &str,
    force: bool,
) -> Result<Value, ToolError> {
    let instance = fetch_instance(clients, instance_id).await?;
    let current = lookup_str(&instance, "lifecycleState").unwrap_or_default();

    if current == state::STOPPED {
        return Ok(json!({
            "success": true,
            "already_stopped": true,
            "message": format!("Instance {} is already stopped", display(&instance, instance_id)),
            "current_state": current,
        }));
    }
    if current != state::RUNNING {
        return Ok(rejected("stop", current));
    }

    let action = if force { "STOP" } else { "SOFTSTOP" };
    clients
        .compute
        .action(&format!("/instances/{instance_id}"), action)
        .await?;
    tracing::info!(instance_id, action, "Initiated instance stop");

    Ok(json!({
        "success": true,
        "message": "Instance stop operation initiated. Check status with get_instance to monitor progress.",
        "current_state": state::STOPPING,
        "instance_id": instance_id,
        "stop_type": if force { "force" } else { "soft" },
    }))
}

/// Parameters of a launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchSpec {
    pub compartment_id: String,
    pub availability_domain: String,
    pub shape: String,
    pub image_id: String,
    pub subnet_id: String,
    pub display_name: Option<String>,
    pub ssh_authorized_keys: Option<String>,
    /// Flex shapes only.
    pub ocpus: Option<f64>,
    pub memory_in_gbs: Option<f64>,
    pub boot_volume_size_in_gbs: Option<u64>,
    pub assign_public_ip: bool,
    pub cloud_init_commands: Vec<String>,
    pub cloud_init_packages: Vec<String>,
}

impl LaunchSpec {
    fn body(&self) -> Result<Value, ToolError> {
        let mut source = json!({"sourceType": "image", "imageId": self.image_id});
        if let Some(size) = self.boot_volume_size_in_gbs {
            source["bootVolumeSizeInGBs"] = json!(size);
        }

        let mut metadata = Map::new();
        if let Some(keys) = &self.ssh_authorized_keys {
            metadata.insert("ssh_authorized_keys".to_string(), json!(keys));
        }
        if !self.cloud_init_commands.is_empty() || !self.cloud_init_packages.is_empty() {
            let user_data =
                cloud_init::user_data(&self.cloud_init_commands, &self.cloud_init_packages)
                    .map_err(|e| ToolError::InvalidArgument(format!("cloud-init: {e}")))?;
            metadata.insert("user_data".to_string(), json!(user_data));
        }

        let mut body = json!({
            "compartmentId": self.compartment_id,
            "availabilityDomain": self.availability_domain,
            "shape": self.shape,
            "sourceDetails": source,
            "createVnicDetails": {
                "subnetId": self.subnet_id,
                "assignPublicIp": self.assign_public_ip,
            },
            "metadata": metadata,
        });
        if let Some(name) = &self.display_name {
            body["displayName"] = json!(name);
        }
        match (self.ocpus, self.memory_in_gbs) {
            (None, None) => {}
            (ocpus, memory) => {
                let mut config = Map::new();
                if let Some(ocpus) = ocpus {
                    config.insert("ocpus".to_string(), json!(ocpus));
                }
                if let Some(memory) = memory {
                    config.insert("memoryInGBs".to_string(), json!(memory));
                }
                body["shapeConfig"] = Value::Object(config);
            }
        }
        Ok(body)
    }
}

/// Launch an instance. Returns once the launch is accepted.
pub async fn create_instance(clients: &ClientTable, spec: &LaunchSpec) -> Result<Value, ToolError> {
    let launched = clients
        .compute
        .post("/instances", Query::new(), spec.body()?)
        .await?;

    let instance_id = lookup_str(&launched, "id").ok_or_else(|| {
        ToolError::UnexpectedResponse("launch response carries no instance id".to_string())
    })?;
    tracing::info!(instance_id, shape = %spec.shape, "Launched instance");

    Ok(json!({
        "success": true,
        "message": format!("Instance {} is being created", display(&launched, instance_id)),
        "instance_id": instance_id,
        "current_state": lookup_str(&launched, "lifecycleState").unwrap_or(state::PROVISIONING),
        "instance": project(&launched, INSTANCE),
    }))
}

/// Terminate an instance, optionally keeping its boot volume.
pub async fn terminate_instance(
    clients: &ClientTable,
    instance_id: &str,
    preserve_boot_volume: bool,
) -> Result<Value, ToolError> {
    let instance = fetch_instance(clients, instance_id).await?;
    let current = lookup_str(&instance, "lifecycleState").unwrap_or_default();

    if current == state::TERMINATED || current == state::TERMINATING {
        return Ok(json!({
            "success": true,
            "already_terminated": true,
            "message": format!("Instance {} is already {}", display(&instance, instance_id), current.to_lowercase()),
            "current_state": current,
        }));
    }

    clients
        .compute
        .delete(
            &format!("/instances/{instance_id}"),
            Query::new().with("preserveBootVolume", preserve_boot_volume.to_string()),
        )
        .await?;
    tracing::info!(instance_id, preserve_boot_volume, "Initiated instance termination");

    Ok(json!({
        "success": true,
        "message": format!("Instance {} termination initiated", display(&instance, instance_id)),
        "current_state": state::TERMINATING,
        "instance_id": instance_id,
        "preserve_boot_volume": preserve_boot_volume,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock_table;
    use oci_mcp_client::Method;

    const ID: &str = "ocid1.instance.oc1..web";

    fn instance(state: &str) -> Value {
        json!({
            "id": ID,
            "displayName": "web-1",
            "compartmentId": "ocid1.compartment",
            "lifecycleState": state,
            "shape": "VM.Standard.E4.Flex",
            "shapeConfig": {"ocpus": 1.0, "memoryInGBs": 16.0, "processors": 1},
            "metadata": {"ssh_authorized_keys": "ssh-ed25519 AAA"},
        })
    }

    #[tokio::test]
    async fn test_list_instances_projects_shape_config() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, "/instances", json!([instance("RUNNING")]));

        let list = list_instances(&clients, "ocid1.compartment").await.unwrap();
        assert_eq!(list[0]["name"], "web-1");
        assert_eq!(list[0]["is_running"], true);
        assert_eq!(list[0]["ocpu_count"], 1.0);
        assert_eq!(list[0]["memory_in_gbs"], 16.0);
        assert!(list[0].get("metadata").is_none());
    }

    #[tokio::test]
    async fn test_get_instance_includes_vnic_attachments() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("STOPPED"));
        mock.on(
            Method::Get,
            "/vnicAttachments",
            json!([{"id": "att1", "vnicId": "vnic1", "lifecycleState": "ATTACHED"}]),
        );

        let record = get_instance(&clients, ID).await.unwrap();
        assert_eq!(record["is_running"], false);
        assert_eq!(record["processors"], 1);
        assert_eq!(record["metadata"]["ssh_authorized_keys"], "ssh-ed25519 AAA");
        assert_eq!(record["vnic_attachments"][0]["vnic_id"], "vnic1");

        let call = &mock.calls_to(Method::Get, "/vnicAttachments")[0];
        assert_eq!(call.query.get("instanceId"), Some(ID));
        assert_eq!(call.query.get("compartmentId"), Some("ocid1.compartment"));
    }

    #[tokio::test]
    async fn test_start_running_instance_is_noop() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("RUNNING"));

        let result = start_instance(&clients, ID).await.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["already_running"], true);
        assert!(mock.calls_to(Method::Post, &format!("/instances/{ID}")).is_empty());
    }

    #[tokio::test]
    async fn test_start_from_provisioning_is_rejected() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("PROVISIONING"));

        let result = start_instance(&clients, ID).await.unwrap();
        assert_eq!(
            result,
            json!({
                "success": false,
                "message": "Cannot start instance from state PROVISIONING",
                "current_state": "PROVISIONING",
            })
        );
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_start_stopped_instance_issues_action() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("STOPPED"));
        mock.on(Method::Post, &format!("/instances/{ID}"), instance("STARTING"));

        let result = start_instance(&clients, ID).await.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["current_state"], "STARTING");

        let action = &mock.calls_to(Method::Post, &format!("/instances/{ID}"))[0];
        assert_eq!(action.query.get("action"), Some("START"));
    }

    #[tokio::test]
    async fn test_stop_uses_softstop_unless_forced() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("RUNNING"));
        mock.on(Method::Post, &format!("/instances/{ID}"), instance("STOPPING"));

        let soft = stop_instance(&clients, ID, false).await.unwrap();
        assert_eq!(soft["stop_type"], "soft");
        assert_eq!(soft["current_state"], "STOPPING");

        let forced = stop_instance(&clients, ID, true).await.unwrap();
        assert_eq!(forced["stop_type"], "force");

        let actions: Vec<_> = mock
            .calls_to(Method::Post, &format!("/instances/{ID}"))
            .iter()
            .map(|c| c.query.get("action").unwrap_or_default().to_string())
            .collect();
        assert_eq!(actions, vec!["SOFTSTOP", "STOP"]);
    }

    #[tokio::test]
    async fn test_stop_stopped_instance_is_noop() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("STOPPED"));

        let result = stop_instance(&clients, ID, false).await.unwrap();
        assert_eq!(result["already_stopped"], true);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_from_starting_is_rejected() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("STARTING"));

        let result = stop_instance(&clients, ID, true).await.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Cannot stop instance from state STARTING");
    }

    #[tokio::test]
    async fn test_create_instance_builds_launch_body() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Post,
            "/instances",
            json!({"id": "new", "displayName": "app", "lifecycleState": "PROVISIONING"}),
        );

        let spec = LaunchSpec {
            compartment_id: "c".to_string(),
            availability_domain: "AD-1".to_string(),
            shape: "VM.Standard.E4.Flex".to_string(),
            image_id: "img".to_string(),
            subnet_id: "sub".to_string(),
            display_name: Some("app".to_string()),
            ssh_authorized_keys: Some("ssh-ed25519 KEY".to_string()),
            ocpus: Some(2.0),
            memory_in_gbs: None,
            boot_volume_size_in_gbs: Some(100),
            assign_public_ip: true,
            cloud_init_commands: vec!["echo hello".to_string()],
            cloud_init_packages: vec![],
        };
        let result = create_instance(&clients, &spec).await.unwrap();
        assert_eq!(result["instance_id"], "new");
        assert_eq!(result["current_state"], "PROVISIONING");

        let body = mock.calls()[0].body.clone().unwrap();
        assert_eq!(body["sourceDetails"]["bootVolumeSizeInGBs"], 100);
        assert_eq!(body["createVnicDetails"]["subnetId"], "sub");
        assert_eq!(body["shapeConfig"], json!({"ocpus": 2.0}));
        assert_eq!(body["metadata"]["ssh_authorized_keys"], "ssh-ed25519 KEY");
        assert!(body["metadata"]["user_data"].is_string());
    }

    #[tokio::test]
    async fn test_terminate_passes_preserve_flag() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("STOPPED"));
        mock.on(Method::Delete, &format!("/instances/{ID}"), Value::Null);

        let result = terminate_instance(&clients, ID, true).await.unwrap();
        assert_eq!(result["current_state"], "TERMINATING");

        let call = &mock.calls_to(Method::Delete, &format!("/instances/{ID}"))[0];
        assert_eq!(call.query.get("preserveBootVolume"), Some("true"));
    }

    #[tokio::test]
    async fn test_terminate_terminated_instance_is_noop() {
        let (mock, clients) = mock_table();
        mock.on(Method::Get, &format!("/instances/{ID}"), instance("TERMINATED"));

        let result = terminate_instance(&clients, ID, false).await.unwrap();
        assert_eq!(result["already_terminated"], true);
        assert!(mock.calls_to(Method::Delete, &format!("/instances/{ID}")).is_empty());
    }

    #[tokio::test]
    async fn test_terminate_refuses_traversal_id() {
        let (mock, clients) = mock_table();
        mock.on(
            Method::Get,
            "/instances/x/../../volumes/ocid1.volume.oc1..victim",
            json!({"lifecycleState": "AVAILABLE"}),
        );

        let err = terminate_instance(&clients, "x/../../volumes/ocid1.volume.oc1..victim", false)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: 'instance_id' is not a valid OCID: \"x/../../volumes/ocid1.volume.oc1..victim\""
        );
        assert!(mock.calls().is_empty());
    }
}
