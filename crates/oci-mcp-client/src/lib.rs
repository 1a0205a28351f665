//! # oci-mcp-client
//!
//! Remote resource client for the OCI MCP server.
//!
//! ```text
//!   tool ──► ServiceClient ──► CloudApi::send(ApiRequest)
//!                                 │
//!                   ┌─────────────┴─────────────┐
//!                   ▼                           ▼
//!             HttpCloudApi                MockCloudApi
//!        (reqwest + RequestSigner)      (scripted, tests)
//! ```
//!
//! A [`ClientTable`] holds one [`ServiceClient`] per OCI subsystem for a single
//! profile. There is no retry layer: a failed call is returned to the caller
//! as a [`ClientError`] immediately.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod service;
pub mod signer;
pub mod table;

pub use api::{ApiFactory, ApiRequest, ApiResponse, CloudApi, Method, Query};
pub use client::ServiceClient;
pub use error::ClientError;
pub use http::{HttpApiFactory, HttpCloudApi};
pub use service::Service;
pub use signer::RequestSigner;
pub use table::ClientTable;
