//! [`CloudApi`] over HTTPS with OCI request signing.

use crate::api::{ApiFactory, ApiRequest, ApiResponse, CloudApi};
use crate::error::ClientError;
use crate::signer::{RequestSigner, http_date};
use async_trait::async_trait;
use oci_mcp_core::Profile;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("oci-mcp-server/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Signed HTTP client for one profile.
#[derive(Debug, Clone)]
pub struct HttpCloudApi {
    region: String,
    signer: RequestSigner,
    http: reqwest::Client,
}

impl HttpCloudApi {
    pub fn new(region: impl Into<String>, signer: RequestSigner) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            region: region.into(),
            signer,
            http,
        })
    }

    /// Full URL of a request, query string included.
    ///
    /// Path segments are appended one by one and percent-encoded, so a
    /// segment can never contain `/`, `?` or `#`. Dot segments are refused
    /// rather than resolved.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let endpoint = request
            .endpoint
            .clone()
            .unwrap_or_else(|| request.service.endpoint(&self.region));
        let base = format!("{}{}", endpoint.trim_end_matches('/'), request.service.base_path());
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::InvalidRequest(format!("bad URL {}: {}", base, e)))?;

        let relative = request.path.strip_prefix('/').unwrap_or(&request.path);
        let segments: Vec<&str> = relative.split('/').collect();
        if let Some(dot) = segments.iter().find(|s| is_dot_segment(s)) {
            return Err(ClientError::InvalidRequest(format!(
                "path segment '{}' in {}",
                dot, request.path
            )));
        }
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidRequest(format!("{} cannot take a path", base)))?
            .pop_if_empty()
            .extend(segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.pairs());
        }
        Ok(url)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().replace("%2e", ".").as_str(),
        "." | ".."
    )
}

#[async_trait]
impl CloudApi for HttpCloudApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(&request)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ClientError::InvalidRequest(format!("no host in {}", url)));
            }
        };
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let body = if request.method.has_body() {
            let value = request.body.clone().unwrap_or_else(|| Value::Object(Default::default()));
            Some(serde_json::to_vec(&value).map_err(|e| ClientError::InvalidRequest(e.to_string()))?)
        } else {
            None
        };

        let headers = self.signer.sign(
            request.method.as_str(),
            &host,
            &target,
            body.as_deref(),
            &http_date(),
        );

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let mut builder = self.http.request(method, url.clone());
        for (name, value) in headers {
            // reqwest derives host and content-length from the URL and body.
            if name == "host" || name == "content-length" {
                continue;
            }
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        tracing::debug!(service = %request.service, method = %request.method, %url, "Sending OCI request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let next_page = header("opc-next-page");
        let request_id = header("opc-request-id");
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !(200..300).contains(&status) {
            let code = body
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string();
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            tracing::debug!(status, %code, request_id = ?request_id, "OCI request failed");
            return Err(ClientError::Service {
                status,
                code,
                message,
                opc_request_id: request_id,
            });
        }

        Ok(ApiResponse {
            status,
            body,
            next_page,
            request_id,
        })
    }
}

/// Builds [`HttpCloudApi`] clients from profiles.
#[derive(Debug, Clone, Default)]
pub struct HttpApiFactory;

impl ApiFactory for HttpApiFactory {
    fn connect(&self, profile: &Profile) -> Result<Arc<dyn CloudApi>, ClientError> {
        let signer = RequestSigner::from_profile(profile)?;
        let api = HttpCloudApi::new(profile.region.clone(), signer)?;
        tracing::info!(profile = %profile.name, region = %profile.region, "Created OCI API client");
        Ok(Arc::new(api))
    }
}
