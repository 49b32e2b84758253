//! Inkdown CLI configuration
//!
//! Persistent credentials for the Inkdown account API, environment-driven
//! endpoints, and the stored GitHub token used when publishing plugins.

#![warn(missing_docs)]
#![deny(unsafe_code)]

use inkdown_core::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Directory under the platform config dir that holds all `ink` state
pub const APP_DIR: &str = "ink";
/// Default OAuth client id of the Inkdown GitHub app
pub const DEFAULT_CLIENT_ID: &str = "Ov23liM0BAkzFlF1II7n";
/// Default base URL of the Inkdown account API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
/// Default GitHub REST API root used when publishing
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Errors from reading or writing `ink` state
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file or directory could not be read or written
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid JSON for its type
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory config could not be encoded
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The platform reports no config directory
    #[error("No configuration directory available on this system")]
    NoConfigDir,
}

/// Stored account credentials, persisted as `config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// API token issued by `ink auth`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Email of the authenticated account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Optional logging overrides for the `ink` binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    #[serde(skip)]
    path: PathBuf,
}

impl CliConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.json"))
    }

    /// Load from the default location, creating it when missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path()?)
    }

    /// Load from `path`, creating the directory and an empty config on first use
    #[instrument(name = "config_load", skip(path))]
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(config_file = ?path, "Loading CLI configuration");

        if let Some(dir) = path.parent() {
            create_dir(dir)?;
        }

        if !path.exists() {
            info!(config_file = ?path, "Configuration file does not exist, creating it");
            let config = Self {
                path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str::<Self>(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.path = path.to_path_buf();

        debug!(
            config_file = ?path,
            authenticated = config.is_authenticated(),
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Write the configuration back to where it was loaded from
    #[instrument(name = "config_save", skip(self))]
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            create_dir(dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        write_private(&self.path, content.as_bytes())?;

        debug!(config_file = ?self.path, "Configuration saved successfully");
        Ok(())
    }

    /// Path this configuration is bound to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when both a token and an email are stored
    pub fn is_authenticated(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.token) && present(&self.email)
    }

    /// Store a token and persist immediately
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), ConfigError> {
        self.token = Some(token.into());
        self.save()
    }

    /// Store token and email together and persist
    pub fn set_credentials(
        &mut self,
        token: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.token = Some(token.into());
        self.email = Some(email.into());
        self.save()
    }

    /// Remove stored credentials and persist; returns the email that was signed in
    pub fn clear_credentials(&mut self) -> Result<Option<String>, ConfigError> {
        self.token = None;
        let email = self.email.take();
        self.save()?;
        Ok(email)
    }
}

/// Endpoints and client identifiers taken from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    /// OAuth client id for the GitHub device flow (`CLIENT_ID`)
    pub client_id: String,
    /// Inkdown account API base URL (`INKDOWN_API_URL`)
    pub api_base_url: String,
    /// GitHub REST API root (`GITHUB_API_URL`)
    pub github_api_url: String,
}

impl Env {
    /// Read the process environment, falling back to built-in defaults
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            client_id: get("CLIENT_ID", DEFAULT_CLIENT_ID),
            api_base_url: get("INKDOWN_API_URL", DEFAULT_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            github_api_url: get("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

/// File-backed store for the GitHub OAuth token
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store at the default location
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self::at(config_dir()?.join("github-token")))
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the saved token, if any
    pub fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(token_file = ?self.path, error = %e, "Failed to read saved GitHub token");
                }
                None
            }
        }
    }

    /// Persist a token, readable only by the current user on unix
    pub fn save(&self, token: &str) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            create_dir(dir)?;
        }

        write_private(&self.path, token.as_bytes())?;

        debug!(token_file = ?self.path, "GitHub token saved");
        Ok(())
    }

    /// Remove the saved token
    pub fn clear(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// `<platform config dir>/ink`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoConfigDir)
}

/// Replace the contents of `path`, which is created or tightened to 0600 on
/// unix before anything is written
fn write_private(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(io_error)?;

    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(io_error)?;
    }

    file.write_all(contents).map_err(io_error)
}

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_creates_empty_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = CliConfig::load_from(&path).unwrap();

        assert!(path.exists());
        assert!(!config.is_authenticated());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn test_empty_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "").unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.token, None);
        assert_eq!(config.email, None);
    }

    #[test]
    fn test_credentials_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CliConfig::load_from(&path).unwrap();
        config.set_credentials("tok_123", "ada@example.com").unwrap();

        let reloaded = CliConfig::load_from(&path).unwrap();
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.email.as_deref(), Some("ada@example.com"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"token": "tok_123", "email": "ada@example.com"}));
    }

    #[test]
    fn test_token_without_email_is_not_authenticated() {
        let dir = TempDir::new().unwrap();
        let mut config = CliConfig::load_from(dir.path().join("config.json")).unwrap();
        config.set_token("tok").unwrap();
        assert!(!config.is_authenticated());

        config.email = Some(String::new());
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_clear_credentials_returns_email() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = CliConfig::load_from(&path).unwrap();
        config.set_credentials("tok", "ada@example.com").unwrap();

        let email = config.clear_credentials().unwrap();
        assert_eq!(email.as_deref(), Some("ada@example.com"));
        assert!(!CliConfig::load_from(&path).unwrap().is_authenticated());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(CliConfig::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_defaults_and_overrides() {
        let env = Env::from_lookup(|_| None);
        assert_eq!(env.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(env.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(env.github_api_url, DEFAULT_GITHUB_API_URL);

        let vars: HashMap<&str, &str> = [
            ("CLIENT_ID", "abc"),
            ("INKDOWN_API_URL", "https://api.inkdown.dev/v1/"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ]
        .into_iter()
        .collect();
        let env = Env::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env.client_id, "abc");
        assert_eq!(env.api_base_url, "https://api.inkdown.dev/v1");
        assert_eq!(env.github_api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_empty_env_value_uses_default() {
        let env = Env::from_lookup(|_| Some(String::new()));
        assert_eq!(env.client_id, DEFAULT_CLIENT_ID);
    }

    #[test]
    fn test_token_store() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::at(dir.path().join("ink").join("github-token"));

        assert_eq!(store.load(), None);
        store.save("gho_abc\n").unwrap();
        assert_eq!(store.load().as_deref(), Some("gho_abc"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.path().join("ink").join("github-token"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_token_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github-token");
        std::fs::write(&path, "old-token-that-is-longer").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = TokenStore::at(&path);
        store.save("gho_new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "gho_new");
    }

    #[cfg(unix)]
    #[test]
    fn test_config_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = CliConfig::load_from(&path).unwrap();
        config.set_token("ink_abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
