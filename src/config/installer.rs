use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIG_SCHEMA_FILE, DEFAULT_API_URL, DEFAULT_MODULES_DIR, DEFAULT_REPOSITORY,
    DEFAULT_REQUEST_TIMEOUT, PLUGIN_MARKER_FILE,
};
use crate::core::InstallerError;
use crate::utils::platform::{get_home_dir, resolve_path};

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV_VAR: &str = "ADAPT_INSTALLER_CONFIG";
/// Environment variable overriding the remote host username.
pub const USERNAME_ENV_VAR: &str = "ADAPT_INSTALLER_USERNAME";
/// Environment variable overriding the remote host token.
pub const TOKEN_ENV_VAR: &str = "ADAPT_INSTALLER_TOKEN";

/// Basic-auth credentials for the remote host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Installer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Repository on the remote host, as `owner/name`.
    pub repository: String,

    /// Base URL of the remote host's REST API.
    pub api_url: String,

    /// URL to clone from. Derived from `repository` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,

    /// Installed-modules directory, relative to the application checkout.
    pub modules_dir: String,

    /// File name marking a package as a framework plugin.
    pub plugin_marker: String,

    /// Location of a plugin's configuration schema, relative to its package root.
    pub schema_file: String,

    pub request_timeout_secs: u64,

    /// Host tools that must be installed, mapped to the accepted version range.
    pub prerequisites: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            clone_url: None,
            modules_dir: DEFAULT_MODULES_DIR.to_string(),
            plugin_marker: PLUGIN_MARKER_FILE.to_string(),
            schema_file: CONFIG_SCHEMA_FILE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            prerequisites: BTreeMap::from([
                ("git".to_string(), "*".to_string()),
                ("node".to_string(), ">=18".to_string()),
                ("npm".to_string(), ">=8".to_string()),
            ]),
            credentials: None,
        }
    }
}

impl InstallerConfig {
    /// Loads the configuration following the documented lookup order.
    ///
    /// An explicitly named file (argument or environment variable) must exist;
    /// the default location may be absent.
    pub async fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        let named = match explicit {
            Some(path) => Some(path.to_string()),
            None => std::env::var(CONFIG_ENV_VAR).ok().filter(|v| !v.is_empty()),
        };

        if let Some(path) = named {
            let path = resolve_path(&path)?;
            return Ok(Self::load_from(&path).await?);
        }

        let path = Self::default_path()?;
        if fs::try_exists(&path).await.unwrap_or(false) {
            Ok(Self::load_from(&path).await?)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads and validates the configuration file at `path`.
    pub async fn load_from(path: &Path) -> Result<Self, InstallerError> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| InstallerError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("adapt")
        } else {
            get_home_dir()?.join(".adapt")
        };

        Ok(config_dir.join("installer.toml"))
    }

    /// Checks values that cannot be expressed in the TOML schema.
    pub fn validate(&self) -> Result<(), InstallerError> {
        let mut parts = self.repository.split('/');
        let valid_repo = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !valid_repo {
            return Err(InstallerError::Validation {
                field: "repository".to_string(),
                reason: format!("expected 'owner/name', got '{}'", self.repository),
            });
        }

        if self.schema_file.is_empty() || Path::new(&self.schema_file).is_absolute() {
            return Err(InstallerError::Validation {
                field: "schema_file".to_string(),
                reason: "must be a relative path inside the plugin package".to_string(),
            });
        }

        if self.plugin_marker.is_empty() {
            return Err(InstallerError::Validation {
                field: "plugin_marker".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        for (tool, range) in &self.prerequisites {
            semver::VersionReq::parse(range).map_err(|e| InstallerError::Validation {
                field: format!("prerequisites.{tool}"),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// URL the application repository is cloned from.
    pub fn clone_url(&self) -> String {
        self.clone_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}.git", self.repository))
    }

    /// Remote host credentials, with the environment overriding the file.
    pub fn credentials(&self) -> Option<Credentials> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let file = self.credentials.as_ref();

        let username = env(USERNAME_ENV_VAR).or_else(|| file.map(|c| c.username.clone()))?;
        let token = env(TOKEN_ENV_VAR).or_else(|| file.map(|c| c.token.clone()))?;
        Some(Credentials { username, token })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Installed-modules directory of the application checkout `app_dir`.
    ///
    /// `~` and environment variables in `modules_dir` are expanded; a relative
    /// result is taken relative to `app_dir`, an absolute one is used as is.
    pub fn modules_path(&self, app_dir: &Path) -> anyhow::Result<PathBuf> {
        Ok(app_dir.join(resolve_path(&self.modules_dir)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = InstallerConfig::default();
        assert_eq!(config.repository, "adapt-security/adapt-authoring");
        assert_eq!(config.clone_url(), "https://github.com/adapt-security/adapt-authoring.git");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("installer.toml");
        std::fs::write(
            &path,
            r#"
repository = "example/fork"
request_timeout_secs = 5

[prerequisites]
node = ">=20"
"#,
        )
        .unwrap();

        let config = InstallerConfig::load_from(&path).await.unwrap();
        assert_eq!(config.repository, "example/fork");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.modules_dir, "node_modules");
        assert_eq!(config.prerequisites.len(), 1);
        assert_eq!(config.prerequisites["node"], ">=20");
    }

    #[tokio::test]
    async fn test_load_rejects_bad_repository() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("installer.toml");
        std::fs::write(&path, r#"repository = "not-a-repo""#).unwrap();

        let err = InstallerConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, InstallerError::Validation { ref field, .. } if field == "repository"));
    }

    #[tokio::test]
    async fn test_load_rejects_bad_range() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("installer.toml");
        std::fs::write(&path, "[prerequisites]\nnode = \"not a range\"\n").unwrap();

        let err = InstallerConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, InstallerError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("installer.toml");
        std::fs::write(&path, "repository = [").unwrap();

        let err = InstallerConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, InstallerError::TomlParse(_)));
    }

    #[tokio::test]
    #[serial]
    async fn test_load_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(InstallerConfig::load(Some(missing.to_str().unwrap())).await.is_err());
    }

    #[test]
    #[serial]
    fn test_credentials_env_overrides_file() {
        let mut config = InstallerConfig::default();
        config.credentials = Some(Credentials {
            username: "file-user".to_string(),
            token: "file-token".to_string(),
        });

        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, "env-token");
            std::env::remove_var(USERNAME_ENV_VAR);
        }
        let creds = config.credentials().unwrap();
        assert_eq!(creds.username, "file-user");
        assert_eq!(creds.token, "env-token");

        unsafe {
            std::env::remove_var(TOKEN_ENV_VAR);
        }
        assert_eq!(config.credentials().unwrap().token, "file-token");
    }

    #[test]
    #[serial]
    fn test_credentials_require_both_parts() {
        unsafe {
            std::env::remove_var(TOKEN_ENV_VAR);
            std::env::set_var(USERNAME_ENV_VAR, "someone");
        }
        assert!(InstallerConfig::default().credentials().is_none());
        unsafe {
            std::env::remove_var(USERNAME_ENV_VAR);
        }
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials {
            username: "u".to_string(),
            token: "secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_modules_path_relative_to_app_dir() {
        let config = InstallerConfig::default();
        let app_dir = Path::new("/srv/adapt");
        assert_eq!(config.modules_path(app_dir).unwrap(), app_dir.join(DEFAULT_MODULES_DIR));

        let config = InstallerConfig {
            modules_dir: "/opt/shared/node_modules".to_string(),
            ..InstallerConfig::default()
        };
        assert_eq!(config.modules_path(app_dir).unwrap(), PathBuf::from("/opt/shared/node_modules"));
    }

    #[test]
    #[serial]
    fn test_modules_path_expands_home_and_env() {
        let config = InstallerConfig {
            modules_dir: "~/shared/node_modules".to_string(),
            ..InstallerConfig::default()
        };
        assert_eq!(
            config.modules_path(Path::new("/srv/adapt")).unwrap(),
            get_home_dir().unwrap().join("shared/node_modules")
        );

        unsafe {
            std::env::set_var("ADAPT_TEST_MODULES_ROOT", "/opt/adapt");
        }
        let config = InstallerConfig {
            modules_dir: "${ADAPT_TEST_MODULES_ROOT}/node_modules".to_string(),
            ..InstallerConfig::default()
        };
        let resolved = config.modules_path(Path::new("/srv/adapt"));
        unsafe {
            std::env::remove_var("ADAPT_TEST_MODULES_ROOT");
        }
        assert_eq!(resolved.unwrap(), PathBuf::from("/opt/adapt/node_modules"));
    }
}
