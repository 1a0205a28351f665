//! Per-subsystem client handle.

use crate::api::{ApiRequest, CloudApi, Method, Query};
use crate::error::ClientError;
use crate::service::Service;
use serde_json::Value;
use std::sync::Arc;

/// Keys under which collection responses carry their elements.
const COLLECTION_KEYS: [&str; 3] = ["items", "entries", "results"];

/// Handle for one OCI subsystem, bound to the active profile's [`CloudApi`].
#[derive(Clone)]
pub struct ServiceClient {
    service: Service,
    api: Arc<dyn CloudApi>,
    endpoint: Option<String>,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ServiceClient {
    pub fn new(service: Service, api: Arc<dyn CloudApi>) -> Self {
        Self {
            service,
            api,
            endpoint: None,
        }
    }

    /// Same client, talking to a specific endpoint instead of the regional host.
    pub fn at_endpoint(&self, service: Service, endpoint: impl Into<String>) -> Self {
        Self {
            service,
            api: self.api.clone(),
            endpoint: Some(endpoint.into()),
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(self.service, method, path).with_endpoint(self.endpoint.clone())
    }

    /// Fetch a single resource.
    pub async fn get(&self, path: &str, query: Query) -> Result<Value, ClientError> {
        let response = self
            .api
            .send(self.request(Method::Get, path).with_query(query))
            .await?;
        Ok(response.body)
    }

    /// Fetch every page of a list call and flatten the elements.
    pub async fn list_all(&self, path: &str, query: Query) -> Result<Vec<Value>, ClientError> {
        self.collect(Method::Get, path, query, None).await
    }

    /// Same as [`list_all`](Self::list_all) for list operations issued as POST.
    pub async fn post_all(
        &self,
        path: &str,
        query: Query,
        body: Value,
    ) -> Result<Vec<Value>, ClientError> {
        self.collect(Method::Post, path, query, Some(body)).await
    }

    /// POST a JSON body.
    pub async fn post(&self, path: &str, query: Query, body: Value) -> Result<Value, ClientError> {
        let response = self
            .api
            .send(self.request(Method::Post, path).with_query(query).with_body(body))
            .await?;
        Ok(response.body)
    }

    /// Invoke a resource action (`POST path?action=NAME`).
    pub async fn action(&self, path: &str, action: &str) -> Result<Value, ClientError> {
        let response = self
            .api
            .send(
                self.request(Method::Post, path)
                    .with_query(Query::new().with("action", action)),
            )
            .await?;
        Ok(response.body)
    }

    /// DELETE a resource.
    pub async fn delete(&self, path: &str, query: Query) -> Result<Value, ClientError> {
        let response = self
            .api
            .send(self.request(Method::Delete, path).with_query(query))
            .await?;
        Ok(response.body)
    }

    async fn collect(
        &self,
        method: Method,
        path: &str,
        mut query: Query,
        body: Option<Value>,
    ) -> Result<Vec<Value>, ClientError> {
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let mut request = self.request(method, path).with_query(query.clone());
            request.body = body.clone();

            let response = self.api.send(request).await?;
            pages += 1;
            items.extend(collection_items(response.body)?);

            match response.next_page {
                Some(page) if !page.is_empty() => query.set("page", page),
                _ => break,
            }
        }

        tracing::debug!(
            service = %self.service,
            path,
            pages,
            count = items.len(),
            "Collected list results"
        );
        Ok(items)
    }
}

/// Elements of a list response: either a bare array or an object holding one
/// under a well-known key.
fn collection_items(body: Value) -> Result<Vec<Value>, ClientError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            for key in COLLECTION_KEYS {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(ClientError::Decode(
                "list response has no collection of items".to_string(),
            ))
        }
        other => Err(ClientError::Decode(format!(
            "expected a list response, got {}",
            other
        ))),
    }
}
