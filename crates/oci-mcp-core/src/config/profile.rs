//! OCI credentials file parsing.
//!
//! The file is INI-formatted: each `[SECTION]` is a profile and keys of the
//! `[DEFAULT]` section are inherited by every other profile.
//!
//! ```text
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=aa:bb:cc
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..aaaa
//! region=us-ashburn-1
//!
//! [FRANKFURT]
//! region=eu-frankfurt-1
//! ```

use super::ConfigError;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the section whose keys every profile inherits.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Environment variable overriding the default profile name.
pub const ENV_PROFILE: &str = "OCI_CLI_PROFILE";

/// Environment variable overriding the credentials file location.
pub const ENV_CONFIG_FILE: &str = "OCI_CONFIG_FILE";

/// Environment variable setting the log level.
pub const ENV_LOG_LEVEL: &str = "OCI_MCP_LOG_LEVEL";

const REQUIRED_KEYS: [&str; 5] = ["user", "tenancy", "region", "fingerprint", "key_file"];

/// A resolved credential bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub user: String,
    pub tenancy: String,
    pub region: String,
    pub fingerprint: String,
    /// Private key path with `~` already expanded.
    pub key_file: PathBuf,
    pub pass_phrase: Option<String>,
}

impl Profile {
    /// The key id used when signing requests.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            name: self.name.clone(),
            user: self.user.clone(),
            tenancy: self.tenancy.clone(),
            region: self.region.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// Non-secret view of a profile, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub user: String,
    pub tenancy: String,
    pub region: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default)]
struct Section {
    name: String,
    entries: HashMap<String, String>,
}

/// Parsed OCI credentials file.
#[derive(Debug, Clone)]
pub struct OciConfigFile {
    path: PathBuf,
    defaults: Option<Section>,
    sections: Vec<Section>,
}

impl OciConfigFile {
    /// Location used when neither a flag nor `OCI_CONFIG_FILE` names one.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".oci")
            .join("config")
    }

    /// Read and parse the credentials file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_tilde(path.as_ref());
        if !path.exists() {
            return Err(ConfigError::CredentialsNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        Self::parse(&content, path)
    }

    /// Parse credentials file content. `path` is kept for messages only.
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut defaults: Option<Section> = None;
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<Section> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| ConfigError::Parse {
                    path: path.clone(),
                    line: index + 1,
                    message: "unterminated section header".to_string(),
                })?;
                merge_section(current.take(), &mut defaults, &mut sections);
                current = Some(Section {
                    name: name.trim().to_string(),
                    entries: HashMap::new(),
                });
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Parse {
                path: path.clone(),
                line: index + 1,
                message: format!("expected key=value, got '{}'", line),
            })?;

            let section = current.as_mut().ok_or_else(|| ConfigError::Parse {
                path: path.clone(),
                line: index + 1,
                message: "key outside of any section".to_string(),
            })?;
            section
                .entries
                .insert(key.trim().to_lowercase(), value.trim().to_string());
        }
        merge_section(current.take(), &mut defaults, &mut sections);

        tracing::debug!(
            path = %path.display(),
            profiles = sections.len() + usize::from(defaults.is_some()),
            "Parsed OCI config file"
        );

        Ok(Self {
            path,
            defaults,
            sections,
        })
    }

    /// Path the file was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Profile names in file order, `DEFAULT` first when present.
    pub fn profile_names(&self) -> Vec<String> {
        self.defaults
            .iter()
            .chain(self.sections.iter())
            .map(|s| s.name.clone())
            .collect()
    }

    /// Check if a profile exists.
    pub fn contains(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Resolve a profile, merging `DEFAULT` keys underneath its own.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        let entries = self.merged(name).ok_or_else(|| ConfigError::ProfileNotFound {
            profile: name.to_string(),
            path: self.path.clone(),
        })?;

        for key in REQUIRED_KEYS {
            if !entries.contains_key(key) {
                return Err(ConfigError::MissingKey {
                    profile: name.to_string(),
                    key: key.to_string(),
                });
            }
        }
        let get = |key: &str| entries.get(key).cloned().unwrap_or_default();

        Ok(Profile {
            name: name.to_string(),
            user: get("user"),
            tenancy: get("tenancy"),
            region: get("region"),
            fingerprint: get("fingerprint"),
            key_file: expand_tilde(Path::new(&get("key_file"))),
            pass_phrase: entries.get("pass_phrase").cloned(),
        })
    }

    /// Summaries of every profile. Missing keys are reported as `N/A`
    /// instead of failing, so a half-written profile is still listed.
    pub fn summaries(&self) -> Vec<ProfileSummary> {
        self.profile_names()
            .into_iter()
            .filter_map(|name| {
                let entries = self.merged(&name)?;
                let get = |key: &str| {
                    entries
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| "N/A".to_string())
                };
                Some(ProfileSummary {
                    user: get("user"),
                    tenancy: get("tenancy"),
                    region: get("region"),
                    fingerprint: get("fingerprint"),
                    name,
                })
            })
            .collect()
    }

    fn section(&self, name: &str) -> Option<&Section> {
        if name == DEFAULT_PROFILE {
            return self.defaults.as_ref();
        }
        self.sections.iter().find(|s| s.name == name)
    }

    fn merged(&self, name: &str) -> Option<HashMap<String, String>> {
        let section = self.section(name)?;
        let mut entries = self
            .defaults
            .as_ref()
            .map(|d| d.entries.clone())
            .unwrap_or_default();
        entries.extend(section.entries.clone());
        Some(entries)
    }
}

fn merge_section(section: Option<Section>, defaults: &mut Option<Section>, sections: &mut Vec<Section>) {
    let Some(section) = section else { return };
    if section.name == DEFAULT_PROFILE {
        match defaults {
            Some(existing) => existing.entries.extend(section.entries),
            None => *defaults = Some(section),
        }
    } else if let Some(existing) = sections.iter_mut().find(|s| s.name == section.name) {
        existing.entries.extend(section.entries);
    } else {
        sections.push(section);
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    if text == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    match (text.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# credentials
[DEFAULT]
user=ocid1.user.oc1..default
fingerprint=aa:bb:cc
key_file=/keys/default.pem
tenancy=ocid1.tenancy.oc1..root
region=us-ashburn-1

[FRANKFURT]
region = eu-frankfurt-1

; half-configured
[BROKEN]
user=ocid1.user.oc1..broken
";

    fn sample() -> OciConfigFile {
        OciConfigFile::parse(SAMPLE, "/tmp/config").unwrap()
    }

    #[test]
    fn test_profile_names_in_file_order() {
        assert_eq!(sample().profile_names(), vec!["DEFAULT", "FRANKFURT", "BROKEN"]);
    }

    #[test]
    fn test_default_keys_are_inherited() {
        let profile = sample().profile("FRANKFURT").unwrap();
        assert_eq!(profile.region, "eu-frankfurt-1");
        assert_eq!(profile.user, "ocid1.user.oc1..default");
        assert_eq!(profile.key_file, PathBuf::from("/keys/default.pem"));
        assert_eq!(
            profile.key_id(),
            "ocid1.tenancy.oc1..root/ocid1.user.oc1..default/aa:bb:cc"
        );
    }

    #[test]
    fn test_unknown_profile() {
        let err = sample().profile("NOPE").unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref profile, .. } if profile == "NOPE"));
        assert!(!sample().contains("NOPE"));
    }

    #[test]
    fn test_missing_key_reported() {
        let file = OciConfigFile::parse("[ONLY]\nuser=u\nregion=r\n", "/tmp/config").unwrap();
        let err = file.profile("ONLY").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "tenancy"));
    }

    #[test]
    fn test_summaries_fill_missing_values() {
        let file = OciConfigFile::parse("[ONLY]\nuser=u\n", "/tmp/config").unwrap();
        let summaries = file.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].user, "u");
        assert_eq!(summaries[0].region, "N/A");
    }

    #[test]
    fn test_key_outside_section_is_error() {
        let err = OciConfigFile::parse("user=u\n", "/tmp/config").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_tilde_expansion() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(expand_tilde(Path::new("~/.oci/key.pem")), home.join(".oci/key.pem"));
        assert_eq!(expand_tilde(Path::new("/abs/key.pem")), PathBuf::from("/abs/key.pem"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = OciConfigFile::load(file.path()).unwrap();
        assert!(config.contains("DEFAULT"));
        assert_eq!(config.path(), file.path());
    }

    #[test]
    fn test_load_missing_file() {
        let err = OciConfigFile::load("/definitely/not/here/config").unwrap_err();
        assert!(matches!(err, ConfigError::CredentialsNotFound(_)));
    }
}
