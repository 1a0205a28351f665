//! Configuration types for the OCI MCP server.
//!
//! Two sources feed the server:
//!
//! - **server.yaml** (optional): transport, listener address, polling policy
//!   and a default profile. Command line flags override it.
//! - **~/.oci/config**: the OCI credentials file holding named profiles.

pub mod mcp;
pub mod polling;
pub mod profile;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use mcp::{DEFAULT_SSE_PORT, McpConfig, Transport};
pub use polling::PollingConfig;
pub use profile::{
    DEFAULT_PROFILE, ENV_CONFIG_FILE, ENV_LOG_LEVEL, ENV_PROFILE, OciConfigFile, Profile,
    ProfileSummary, expand_tilde,
};

/// Complete server configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// MCP transport settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Backoff policy for state-changing operations that wait on a resource.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Credentials file and profile selection.
    #[serde(default)]
    pub oci: OciSettings,
}

/// Which credentials file and profile to start with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OciSettings {
    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub config_file: Option<PathBuf>,
}

impl OciSettings {
    /// Profile name, falling back to `DEFAULT`.
    pub fn profile_or_default(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    /// Credentials file path, falling back to `~/.oci/config`.
    pub fn config_file_or_default(&self) -> PathBuf {
        self.config_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(OciConfigFile::default_path)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(
        "OCI config file not found at {}. Please create it or set OCI_CONFIG_FILE environment variable.",
        .0.display()
    )]
    CredentialsNotFound(PathBuf),

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("profile '{profile}' not found in {}", .path.display())]
    ProfileNotFound { profile: String, path: PathBuf },

    #[error("profile '{profile}' is missing required key '{key}'")]
    MissingKey { profile: String, key: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make polling spin or never wait.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let polling = &self.polling;
        if polling.initial_interval_ms == 0 {
            return Err(ConfigError::Config(
                "polling.initial_interval_ms must be greater than zero".to_string(),
            ));
        }
        if polling.max_interval_ms < polling.initial_interval_ms {
            return Err(ConfigError::Config(
                "polling.max_interval_ms must not be smaller than polling.initial_interval_ms"
                    .to_string(),
            ));
        }
        if polling.multiplier < 1.0 {
            return Err(ConfigError::Config(
                "polling.multiplier must be at least 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
