//! The request/response seam between tools and the network.
//!
//! Tools never talk HTTP directly. They build an [`ApiRequest`] and hand it to
//! a [`CloudApi`], which is either the signing HTTP client or a scripted mock.

use crate::error::ClientError;
use crate::service::Service;
use async_trait::async_trait;
use oci_mcp_core::Profile;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// HTTP method of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Methods whose requests carry a JSON body and the extra signed headers.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    /// Add a parameter only when a value is present.
    pub fn with_opt<V: Into<String>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Set a parameter, replacing an earlier value of the same key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// A single remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: Service,
    pub method: Method,
    /// Path below the service's versioned base, e.g. `/instances/ocid1...`.
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
    /// Full endpoint (scheme and host) replacing the service's regional host.
    pub endpoint: Option<String>,
}

impl ApiRequest {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            endpoint: None,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Response of a remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Decoded JSON body. Non-JSON bodies are kept as a string value and
    /// empty bodies as `null`.
    pub body: Value,
    /// Value of the `opc-next-page` header.
    pub next_page: Option<String>,
    /// Value of the `opc-request-id` header.
    pub request_id: Option<String>,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            next_page: None,
            request_id: None,
        }
    }
}

/// Performs authenticated calls against OCI services.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Builds a [`CloudApi`] for a profile. Used at startup and on every profile
/// switch.
pub trait ApiFactory: Send + Sync {
    fn connect(&self, profile: &Profile) -> Result<Arc<dyn CloudApi>, ClientError>;
}
