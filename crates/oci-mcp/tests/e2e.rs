//! End-to-end JSON-RPC tests against a scripted OCI backend.

use oci_mcp::protocol::codes;
use oci_mcp::{McpServer, OutcomeKind, ProfileSession, Session, catalog};
use oci_mcp_client::Method;
use oci_mcp_client::mock::{MockApiFactory, MockCloudApi};
use oci_mcp_core::McpConfig;
use oci_mcp_tools::PollPolicy;
use serde_json::{Value, json};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const CONFIG: &str = "\
[DEFAULT]
user=ocid1.user.oc1..u
fingerprint=aa:bb
key_file=/keys/oci.pem
tenancy=ocid1.tenancy.oc1..t
region=us-ashburn-1

[FRANKFURT]
region=eu-frankfurt-1
";

const INSTANCE: &str = "ocid1.instance.oc1..i";
const COMPARTMENT: &str = "ocid1.compartment.oc1..c";

struct Harness {
    server: McpServer,
    mock: Arc<MockCloudApi>,
    session: Session,
    notes: mpsc::UnboundedReceiver<Value>,
    _config: tempfile::NamedTempFile,
    next_id: u64,
}

impl Harness {
    async fn new() -> Self {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, "{CONFIG}").unwrap();

        let mock = Arc::new(MockCloudApi::new());
        let factory = MockApiFactory::new(mock.clone());
        let profiles = Arc::new(ProfileSession::new(config.path(), Arc::new(factory)));
        profiles.activate("DEFAULT").await.unwrap();

        let poll = PollPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            multiplier: 2.0,
            timeout: Duration::from_millis(20),
        };
        let server = McpServer::new(McpConfig::default(), catalog::registry().unwrap(), profiles, poll);
        let (tx, notes) = mpsc::unbounded_channel();

        Self {
            server,
            mock,
            session: Session::new(tx),
            notes,
            _config: config,
            next_id: 0,
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let raw = json!({"jsonrpc": "2.0", "id": self.next_id, "method": method, "params": params});
        let response = self
            .server
            .handle_message(&raw.to_string(), &mut self.session)
            .await
            .unwrap();
        serde_json::to_value(response).unwrap()
    }

    /// Call a tool and decode the outcome carried in its text content.
    async fn call(&mut self, tool: &str, arguments: Value) -> Value {
        let response = self
            .request("tools/call", json!({"name": tool, "arguments": arguments}))
            .await;
        let result = &response["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    fn messages(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(note) = self.notes.try_recv() {
            assert_eq!(note["method"], "notifications/message");
            out.push(note["params"]["data"].as_str().unwrap().to_string());
        }
        out
    }
}

fn instance(state: &str) -> Value {
    json!({
        "id": INSTANCE,
        "displayName": "web-1",
        "lifecycleState": state,
        "compartmentId": COMPARTMENT,
        "shape": "VM.Standard.E4.Flex",
    })
}

#[tokio::test]
async fn test_initialize_then_list_tools() {
    let mut h = Harness::new().await;

    let init = h.request("initialize", json!({"protocolVersion": "2024-11-05"})).await;
    assert_eq!(init["result"]["serverInfo"]["name"], "oci-mcp-server");

    let list = h.request("tools/list", json!({})).await;
    let tools = list["result"]["tools"].as_array().unwrap();
    let start = tools.iter().find(|t| t["name"] == "start_instance").unwrap();
    assert_eq!(start["inputSchema"]["required"], json!(["instance_id"]));
    assert_eq!(start["annotations"]["destructiveHint"], true);
}

#[tokio::test]
async fn test_start_instance_already_running() {
    let mut h = Harness::new().await;
    h.mock
        .on(Method::Get, &format!("/instances/{INSTANCE}"), instance("RUNNING"));

    let outcome = h.call("start_instance", json!({"instance_id": INSTANCE})).await;

    assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Business);
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["already_running"], true);
    assert_eq!(outcome["current_state"], "RUNNING");
    assert!(h.mock.calls_to(Method::Post, &format!("/instances/{INSTANCE}")).is_empty());
    assert_eq!(
        h.messages(),
        vec![
            format!("Starting instance {INSTANCE}..."),
            "Instance web-1 is already running".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_start_instance_rejected_while_provisioning() {
    let mut h = Harness::new().await;
    h.mock
        .on(Method::Get, &format!("/instances/{INSTANCE}"), instance("PROVISIONING"));

    let outcome = h.call("start_instance", json!({"instance_id": INSTANCE})).await;

    assert_eq!(
        outcome,
        json!({
            "success": false,
            "message": "Cannot start instance from state PROVISIONING",
            "current_state": "PROVISIONING",
        })
    );
    let messages = h.messages();
    assert_eq!(
        messages.last().unwrap(),
        "Business state: Cannot start instance from state PROVISIONING"
    );
}

#[tokio::test]
async fn test_list_fault_becomes_wrapped_error_outcome() {
    let mut h = Harness::new().await;
    h.mock.on_error(
        Method::Get,
        "/instances",
        401,
        "NotAuthenticated",
        "The required information to complete authentication was not provided",
    );

    let outcome = h.call("list_instances", json!({"compartment_id": COMPARTMENT})).await;

    assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Error);
    let items = outcome.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let error = items[0]["error"].as_str().unwrap();
    assert!(error.starts_with("Error listing instances: NotAuthenticated (401)"));
    assert_eq!(h.messages().last().unwrap(), error);
}

#[tokio::test]
async fn test_terminate_with_traversal_id_sends_nothing() {
    let mut h = Harness::new().await;
    let id = "x/../../volumes/ocid1.volume.oc1..victim";

    let outcome = h
        .call("terminate_instance", json!({"instance_id": id}))
        .await;

    assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Error);
    let error = outcome["error"].as_str().unwrap();
    assert!(
        error.starts_with("Error terminating instance: invalid argument"),
        "{error}"
    );
    assert!(h.mock.calls().is_empty());
}

#[tokio::test]
async fn test_missing_argument_is_an_error_outcome() {
    let mut h = Harness::new().await;

    let outcome = h.call("get_instance", json!({})).await;

    assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Error);
    let error = outcome["error"].as_str().unwrap();
    assert!(error.starts_with("Error getting instance details: "));
    assert!(error.contains("instance_id"));
    assert!(h.mock.calls().is_empty());
}

#[tokio::test]
async fn test_profile_switching() {
    let mut h = Harness::new().await;

    let outcome = h.call("set_oci_profile", json!({"profile_name": "MISSING"})).await;
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["current_profile"], "DEFAULT");
    assert!(
        outcome["message"]
            .as_str()
            .unwrap()
            .starts_with("Profile 'MISSING' not found. Available profiles: ")
    );

    let outcome = h.call("set_oci_profile", json!({"profile_name": "FRANKFURT"})).await;
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["previous_profile"], "DEFAULT");
    assert_eq!(outcome["region"], "eu-frankfurt-1");

    let current = h.call("get_current_oci_profile", json!({})).await;
    assert_eq!(current["current_profile"], "FRANKFURT");
    assert_eq!(current["tenancy"], "ocid1.tenancy.oc1..t");
}

#[tokio::test]
async fn test_stop_db_node_polls_until_stopped() {
    let mut h = Harness::new().await;
    let node = "ocid1.dbnode.oc1..n";
    let path = format!("/dbNodes/{node}");
    h.mock
        .on(Method::Get, &path, json!({"id": node, "lifecycleState": "AVAILABLE"}))
        .on(Method::Get, &path, json!({"id": node, "lifecycleState": "STOPPING"}))
        .on(Method::Get, &path, json!({"id": node, "lifecycleState": "STOPPED"}));
    h.mock
        .on(Method::Post, &path, json!({"id": node, "lifecycleState": "STOPPING"}));

    let outcome = h.call("stop_db_node", json!({"db_node_id": node})).await;

    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["current_state"], "STOPPED");
    let actions = h.mock.calls_to(Method::Post, &path);
    assert_eq!(actions.len(), 1);
}

#[tokio::test]
async fn test_unknown_tool_and_method() {
    let mut h = Harness::new().await;

    let response = h
        .request("tools/call", json!({"name": "drop_tenancy", "arguments": {}}))
        .await;
    assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);

    let response = h.request("prompts/list", json!({})).await;
    assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
}
