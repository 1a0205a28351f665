//! Active profile and its client table.
//!
//! The table is held behind a single `RwLock<Option<Arc<..>>>`. A tool call
//! takes one snapshot of the `Arc` at its start and uses it throughout, so a
//! concurrent profile switch is observed either entirely or not at all.

use oci_mcp_client::{ApiFactory, ClientError, ClientTable};
use oci_mcp_core::{OciConfigFile, Profile};
use oci_mcp_tools::ToolError;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ProfileSession {
    config_file: PathBuf,
    factory: Arc<dyn ApiFactory>,
    active: RwLock<Option<Arc<ClientTable>>>,
}

impl std::fmt::Debug for ProfileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSession")
            .field("config_file", &self.config_file)
            .finish_non_exhaustive()
    }
}

impl ProfileSession {
    /// A session with no active profile.
    pub fn new(config_file: impl Into<PathBuf>, factory: Arc<dyn ApiFactory>) -> Self {
        Self {
            config_file: config_file.into(),
            factory,
            active: RwLock::new(None),
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Snapshot of the active client table.
    pub async fn current(&self) -> Option<Arc<ClientTable>> {
        self.active.read().await.clone()
    }

    pub async fn current_profile_name(&self) -> Option<String> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|table| table.profile.name.clone())
    }

    /// The credentials file is re-read on every request so edits made while
    /// the server runs are picked up.
    fn load(&self) -> Result<OciConfigFile, ClientError> {
        Ok(OciConfigFile::load(&self.config_file)?)
    }

    fn connect(&self, profile: Profile) -> Result<Arc<ClientTable>, ClientError> {
        let table = ClientTable::connect(profile, self.factory.as_ref())?;
        Ok(Arc::new(table))
    }

    /// Build clients for `name` and make them active.
    pub async fn activate(&self, name: &str) -> Result<Arc<ClientTable>, ClientError> {
        let profile = self.load()?.profile(name)?;
        let table = self.connect(profile)?;
        *self.active.write().await = Some(table.clone());
        tracing::info!(profile = %name, region = %table.profile.region, "OCI clients initialized");
        Ok(table)
    }

    /// `list_oci_profiles`
    pub async fn list_profiles(&self) -> Result<Value, ToolError> {
        let file = self.load()?;
        let profiles = file.summaries();
        tracing::info!(count = profiles.len(), path = %file.path().display(), "Found profiles");

        Ok(json!({
            "profiles": profiles,
            "current_profile": self.current_profile_name().await,
            "config_file": file.path().display().to_string(),
        }))
    }

    /// `get_current_oci_profile`
    pub async fn describe_current(&self) -> Value {
        match self.current().await {
            Some(table) => {
                let summary = table.profile.summary();
                json!({
                    "current_profile": summary.name,
                    "user": summary.user,
                    "tenancy": summary.tenancy,
                    "region": summary.region,
                    "fingerprint": summary.fingerprint,
                })
            }
            None => json!({
                "success": false,
                "message": "No OCI profile is active. Use list_oci_profiles and set_oci_profile to select one.",
                "current_profile": null,
            }),
        }
    }

    /// `set_oci_profile`. An unknown name is a business outcome and leaves
    /// the active table untouched. Credential or client errors are faults.
    pub async fn switch(&self, name: &str) -> Result<Value, ToolError> {
        let previous = self.current_profile_name().await;
        let file = self.load()?;

        if !file.contains(name) {
            let available = file.profile_names().join(", ");
            tracing::info!(profile = %name, "Requested profile does not exist");
            return Ok(json!({
                "success": false,
                "message": format!("Profile '{name}' not found. Available profiles: {available}"),
                "current_profile": previous,
            }));
        }

        let profile = file.profile(name).map_err(ClientError::from)?;
        let table = self.connect(profile)?;
        let region = table.profile.region.clone();
        *self.active.write().await = Some(table);
        tracing::info!(profile = %name, previous = ?previous, "Switched OCI profile");

        Ok(json!({
            "success": true,
            "message": format!("Switched to profile '{name}'"),
            "previous_profile": previous,
            "current_profile": name,
            "region": region,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oci_mcp_client::mock::{MockApiFactory, MockCloudApi};
    use std::io::Write;

    const CONFIG: &str = "\
[DEFAULT]
user=ocid1.user.oc1..u
fingerprint=aa:bb
key_file=/keys/oci.pem
tenancy=ocid1.tenancy.oc1..t
region=us-ashburn-1

[FRANKFURT]
region=eu-frankfurt-1

[BROKEN]
region=uk-london-1
";

    fn session(factory: MockApiFactory) -> (ProfileSession, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{CONFIG}").unwrap();
        (ProfileSession::new(file.path(), Arc::new(factory)), file)
    }

    fn factory() -> MockApiFactory {
        MockApiFactory::new(Arc::new(MockCloudApi::new()))
    }

    #[tokio::test]
    async fn test_starts_without_profile() {
        let (session, _file) = session(factory());
        assert!(session.current().await.is_none());
        let described = session.describe_current().await;
        assert_eq!(described["success"], false);
        assert!(described["current_profile"].is_null());
    }

    #[tokio::test]
    async fn test_switch_inherits_default_keys() {
        let (session, _file) = session(factory());
        session.activate("DEFAULT").await.unwrap();

        let result = session.switch("FRANKFURT").await.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["previous_profile"], "DEFAULT");
        assert_eq!(result["region"], "eu-frankfurt-1");

        let table = session.current().await.unwrap();
        assert_eq!(table.profile.tenancy, "ocid1.tenancy.oc1..t");
        assert_eq!(session.describe_current().await["current_profile"], "FRANKFURT");
    }

    #[tokio::test]
    async fn test_unknown_profile_keeps_active_table() {
        let (session, _file) = session(factory());
        let before = session.activate("DEFAULT").await.unwrap();

        let result = session.switch("MISSING").await.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["current_profile"], "DEFAULT");
        assert!(
            result["message"]
                .as_str()
                .unwrap()
                .starts_with("Profile 'MISSING' not found")
        );
        assert!(Arc::ptr_eq(&before, &session.current().await.unwrap()));
    }

    #[tokio::test]
    async fn test_client_failure_is_a_fault() {
        let (session, _file) = session(factory().failing_for("BROKEN"));
        session.activate("DEFAULT").await.unwrap();

        let err = session.switch("BROKEN").await.unwrap_err();
        assert!(matches!(err, ToolError::Client(ClientError::Auth(_))));
        assert_eq!(session.current_profile_name().await.as_deref(), Some("DEFAULT"));
    }

    #[tokio::test]
    async fn test_list_profiles_marks_current() {
        let (session, _file) = session(factory());
        session.activate("FRANKFURT").await.unwrap();

        let listed = session.list_profiles().await.unwrap();
        let names: Vec<&str> = listed["profiles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["DEFAULT", "FRANKFURT", "BROKEN"]);
        assert_eq!(listed["current_profile"], "FRANKFURT");
    }

    #[tokio::test]
    async fn test_missing_credentials_file() {
        let session = ProfileSession::new("/nonexistent/oci/config", Arc::new(factory()));
        assert!(session.list_profiles().await.is_err());
        assert!(session.activate("DEFAULT").await.is_err());
    }
}
