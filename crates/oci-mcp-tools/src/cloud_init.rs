//! cloud-init user data for instance launches.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CloudConfig<'a> {
    package_update: bool,
    package_upgrade: bool,
    #[serde(skip_serializing_if = "is_empty")]
    packages: &'a [String],
    runcmd: &'a [String],
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

/// Render a `#cloud-config` document that installs `packages` and runs
/// `commands` on first boot.
pub fn cloud_config(commands: &[String], packages: &[String]) -> Result<String, serde_yaml::Error> {
    let body = serde_yaml::to_string(&CloudConfig {
        package_update: true,
        package_upgrade: true,
        packages,
        runcmd: commands,
    })?;
    Ok(format!("#cloud-config\n{}", body))
}

/// Base64 `user_data` metadata value for a launch request.
pub fn user_data(commands: &[String], packages: &[String]) -> Result<String, serde_yaml::Error> {
    let document = cloud_config(commands, packages)?;
    tracing::debug!(
        commands = commands.len(),
        packages = packages.len(),
        "Rendered cloud-init user data"
    );
    Ok(STANDARD.encode(document))
}
