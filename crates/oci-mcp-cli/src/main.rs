use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use oci_mcp::{McpServer, ProfileSession, catalog};
use oci_mcp_client::HttpApiFactory;
use oci_mcp_core::{ENV_CONFIG_FILE, ENV_LOG_LEVEL, ENV_PROFILE, ServerConfig, Transport};
use oci_mcp_tools::PollPolicy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "oci-mcp-server",
    version,
    about = "MCP server exposing Oracle Cloud Infrastructure operations as tools"
)]
struct Cli {
    /// OCI profile to activate at startup
    #[arg(long, env = ENV_PROFILE)]
    profile: Option<String>,

    /// Path to the OCI credentials file
    #[arg(long = "config-file", env = ENV_CONFIG_FILE)]
    config_file: Option<PathBuf>,

    /// Transport to serve on
    #[arg(long, value_enum)]
    transport: Option<TransportArg>,

    /// Shorthand for --transport sse
    #[arg(long, default_value_t = false, conflicts_with = "transport")]
    sse: bool,

    /// Host to bind for the SSE transport
    #[arg(long)]
    host: Option<String>,

    /// Port to bind for the SSE transport
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Optional YAML server configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Upper bound on the time spent waiting for a resource to change state
    #[arg(long = "poll-timeout-secs")]
    poll_timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransportArg {
    Stdio,
    Sse,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdio => Transport::Stdio,
            TransportArg::Sse => Transport::Sse,
        }
    }
}

impl Cli {
    /// Built-in defaults, overridden by the YAML file, overridden by flags.
    fn server_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("Failed to load server config {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if self.sse {
            config.mcp.transport = Transport::Sse;
        } else if let Some(transport) = self.transport {
            config.mcp.transport = transport.into();
        }
        if let Some(host) = &self.host {
            config.mcp.host = host.clone();
        }
        if let Some(port) = self.port {
            config.mcp.port = port;
        }
        if let Some(timeout) = self.poll_timeout_secs {
            config.polling.timeout_secs = timeout;
        }
        if self.profile.is_some() {
            config.oci.profile = self.profile.clone();
        }
        if self.config_file.is_some() {
            config.oci.config_file = self.config_file.clone();
        }
        Ok(config)
    }
}

/// `--debug` > `OCI_MCP_LOG_LEVEL` > `RUST_LOG` > `info`.
fn log_filter(debug: bool, level: Option<String>, rust_log: Option<String>) -> String {
    if debug {
        return "debug".to_string();
    }
    level
        .or(rust_log)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn init_tracing(debug: bool) {
    let filter = log_filter(
        debug,
        std::env::var(ENV_LOG_LEVEL).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    // stdout carries the stdio protocol stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = cli.server_config()?;
    let profile = config.oci.profile_or_default().to_string();
    let config_file = config.oci.config_file_or_default();

    let profiles = Arc::new(ProfileSession::new(&config_file, Arc::new(HttpApiFactory)));
    if let Err(e) = profiles.activate(&profile).await {
        tracing::warn!(
            profile = %profile,
            config_file = %config_file.display(),
            error = %e,
            "Could not initialize OCI clients; starting without an active profile"
        );
    }

    let registry = catalog::registry().context("Failed to build the tool catalogue")?;
    tracing::info!(
        transport = ?config.mcp.transport,
        tools = registry.len(),
        profile = %profile,
        "Starting OCI MCP server"
    );

    let server = McpServer::new(
        config.mcp.clone(),
        registry,
        profiles,
        PollPolicy::from(&config.polling),
    );

    tokio::select! {
        result = server.run() => result.context("MCP server failed")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["oci-mcp-server"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_log_filter_precedence() {
        assert_eq!(log_filter(true, Some("warn".into()), Some("trace".into())), "debug");
        assert_eq!(log_filter(false, Some("warn".into()), Some("trace".into())), "warn");
        assert_eq!(log_filter(false, None, Some("trace".into())), "trace");
        assert_eq!(log_filter(false, None, None), "info");
    }

    #[test]
    fn test_sse_shorthand() {
        let config = parse(&["--sse", "--port", "9000"]).server_config().unwrap();
        assert_eq!(config.mcp.transport, Transport::Sse);
        assert_eq!(config.mcp.port, 9000);
        assert_eq!(config.mcp.host, "127.0.0.1");
    }

    #[test]
    fn test_sse_conflicts_with_transport() {
        let result = Cli::try_parse_from(["oci-mcp-server", "--sse", "--transport", "stdio"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "mcp:\n  transport: sse\n  port: 5000\npolling:\n  timeout_secs: 120\noci:\n  profile: FRANKFURT\n"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["--config", path]).server_config().unwrap();
        assert_eq!(config.mcp.transport, Transport::Sse);
        assert_eq!(config.mcp.port, 5000);
        assert_eq!(config.polling.timeout_secs, 120);
        assert_eq!(config.oci.profile_or_default(), "FRANKFURT");

        let config = parse(&[
            "--config",
            path,
            "--transport",
            "stdio",
            "--poll-timeout-secs",
            "30",
            "--profile",
            "DEFAULT",
        ])
        .server_config()
        .unwrap();
        assert_eq!(config.mcp.transport, Transport::Stdio);
        assert_eq!(config.polling.timeout_secs, 30);
        assert_eq!(config.oci.profile_or_default(), "DEFAULT");
    }

    #[test]
    fn test_missing_yaml_is_an_error() {
        let result = parse(&["--config", "/nonexistent/server.yaml"]).server_config();
        assert!(result.is_err());
    }
}
