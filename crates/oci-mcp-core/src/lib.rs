//! # oci-mcp-core
//!
//! Shared configuration types for the OCI MCP server.
//!
//! - [`config::ServerConfig`]: optional YAML server configuration (transport,
//!   polling policy, default profile).
//! - [`config::OciConfigFile`]: the OCI credentials file (`~/.oci/config`),
//!   parsed into named [`config::Profile`]s.
//! - [`state`]: lifecycle state names used by the state-changing tools.

pub mod config;
pub mod state;

pub use config::{
    ConfigError, DEFAULT_PROFILE, DEFAULT_SSE_PORT, ENV_CONFIG_FILE, ENV_LOG_LEVEL, ENV_PROFILE,
    McpConfig, OciConfigFile, OciSettings, PollingConfig, Profile, ProfileSummary, ServerConfig,
    Transport,
};
