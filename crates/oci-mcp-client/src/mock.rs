//! Scripted in-memory [`CloudApi`] for tests.
//!
//! Replies are registered per `(method, path)`. Several replies for the same
//! key are served in order and the last one repeats, which is how polling
//! sequences (`STOPPING`, `STOPPING`, `STOPPED`) are scripted.

use crate::api::{ApiFactory, ApiRequest, ApiResponse, CloudApi, Method};
use crate::error::ClientError;
use async_trait::async_trait;
use oci_mcp_core::Profile;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Reply {
    Ok(ApiResponse),
    Fail {
        status: u16,
        code: String,
        message: String,
    },
}

/// Scripted [`CloudApi`] that records every request it receives.
#[derive(Debug, Default)]
pub struct MockCloudApi {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockCloudApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        lock(&self.replies)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Reply with `body` (HTTP 200).
    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.push(method, path, Reply::Ok(ApiResponse::ok(body)));
        self
    }

    /// Reply with one page of a list, pointing at `next_page` when given.
    pub fn on_page(&self, method: Method, path: &str, body: Value, next_page: Option<&str>) -> &Self {
        let mut response = ApiResponse::ok(body);
        response.next_page = next_page.map(str::to_string);
        self.push(method, path, Reply::Ok(response));
        self
    }

    /// Reply with a service error.
    pub fn on_error(&self, method: Method, path: &str, status: u16, code: &str, message: &str) -> &Self {
        self.push(
            method,
            path,
            Reply::Fail {
                status,
                code: code.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        lock(&self.calls).clone()
    }

    /// Requests received for one `(method, path)`.
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CloudApi for MockCloudApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let key = (request.method, request.path.clone());
        lock(&self.calls).push(request);

        let reply = {
            let mut replies = lock(&self.replies);
            match replies.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Ok(response)) => Ok(response),
            Some(Reply::Fail {
                status,
                code,
                message,
            }) => Err(ClientError::Service {
                status,
                code,
                message,
                opc_request_id: Some("mock-request".to_string()),
            }),
            None => Err(ClientError::Service {
                status: 404,
                code: "NotAuthorizedOrNotFound".to_string(),
                message: format!("no mock reply for {} {}", key.0, key.1),
                opc_request_id: None,
            }),
        }
    }
}

/// [`ApiFactory`] handing out one shared [`MockCloudApi`].
#[derive(Debug, Clone, Default)]
pub struct MockApiFactory {
    api: Arc<MockCloudApi>,
    failing: HashSet<String>,
}

impl MockApiFactory {
    pub fn new(api: Arc<MockCloudApi>) -> Self {
        Self {
            api,
            failing: HashSet::new(),
        }
    }

    /// Make `connect` fail for the named profile.
    pub fn failing_for(mut self, profile: &str) -> Self {
        self.failing.insert(profile.to_string());
        self
    }

    pub fn api(&self) -> Arc<MockCloudApi> {
        self.api.clone()
    }
}

impl ApiFactory for MockApiFactory {
    fn connect(&self, profile: &Profile) -> Result<Arc<dyn CloudApi>, ClientError> {
        if self.failing.contains(&profile.name) {
            return Err(ClientError::Auth(format!(
                "cannot read key file {}",
                profile.key_file.display()
            )));
        }
        Ok(self.api.clone())
    }
}
