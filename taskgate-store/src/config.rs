//! Gateway configuration.
//!
//! Loaded from `<config dir>/taskgate/config.json`, then overlaid with
//! environment variables. Every section has defaults, so an empty or
//! missing file is valid until credentials are required.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskgate_fetch::{Credentials, DEFAULT_BASE_URL, LimitsConfig, RetryStrategy};
use tracing::{debug, info};

use crate::cache::CacheConfig;
use crate::error::StoreError;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "TRELLO_API_KEY";
/// Environment variable holding the user token.
pub const ENV_TOKEN: &str = "TRELLO_TOKEN";
/// Environment variable holding the default board.
pub const ENV_DEFAULT_BOARD: &str = "DEFAULT_BOARD_ID";
/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "TRELLO_BASE_URL";

// ============================================================================
// Config
// ============================================================================

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Provider user token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Board used when an intent names none.
    #[serde(default)]
    pub default_board_id: Option<String>,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Rate limiter buckets.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Retry policy for rate-limited calls.
    #[serde(default)]
    pub retry: RetryStrategy,
    /// Reference data cache sizing.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Task writing behavior.
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Task writing behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Name of the checklist created for checklist items.
    #[serde(default = "default_checklist_name")]
    pub checklist_name: String,
    /// List names tried, in order, when an intent names no list.
    #[serde(default = "default_list_keywords")]
    pub default_list_keywords: Vec<String>,
    /// Extra member aliases: username to alternative spellings.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_checklist_name() -> String {
    "Checklist".to_string()
}

fn default_list_keywords() -> Vec<String> {
    ["yapılacak", "todo", "backlog"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            checklist_name: default_checklist_name(),
            default_list_keywords: default_list_keywords(),
            aliases: BTreeMap::new(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            token: None,
            default_board_id: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            limits: LimitsConfig::default(),
            retry: RetryStrategy::default(),
            cache: CacheConfig::default(),
            writer: WriterConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskgate")
            .join("config.json")
    }

    /// Loads the default file and applies the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, StoreError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Overlays values from the environment.
    ///
    /// `lookup` resolves a variable name; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(board) = get(ENV_DEFAULT_BOARD) {
            self.default_board_id = Some(board);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
    }

    /// Saves configuration to a specific path.
    ///
    /// On Unix the file is made readable by the owner only, since it may
    /// hold the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        restrict_permissions(path)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the first bad value.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.limits
            .general
            .validate()
            .map_err(|e| StoreError::Config(format!("limits.general: {e}")))?;
        self.limits
            .restricted
            .validate()
            .map_err(|e| StoreError::Config(format!("limits.restricted: {e}")))?;

        if self.retry.max_attempts == 0 {
            return Err(StoreError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.cache.capacity == 0 {
            return Err(StoreError::Config("cache.capacity must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(StoreError::Config("request_timeout_secs must be at least 1".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(StoreError::Config("base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Returns the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCredential`] if the key or token is
    /// absent or blank.
    pub fn credentials(&self) -> Result<Credentials, StoreError> {
        let key = non_blank(self.api_key.as_deref()).ok_or(StoreError::MissingCredential(ENV_API_KEY))?;
        let token = non_blank(self.token.as_deref()).ok_or(StoreError::MissingCredential(ENV_TOKEN))?;
        Ok(Credentials::new(key, token))
    }

    /// Returns the HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "https://api.trello.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.cache.capacity, 120);
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.writer.checklist_name, "Checklist");
        assert_eq!(config.writer.default_list_keywords[0], "yapılacak");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = GatewayConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.limits, LimitsConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"default_board_id": "b1", "cache": {"ttl_secs": 60}, "writer": {"aliases": {"mehmet": ["memo"]}}}"#,
        )
        .unwrap();

        let config = GatewayConfig::load_from(&path).unwrap();
        assert_eq!(config.default_board_id.as_deref(), Some("b1"));
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.capacity, 120);
        assert_eq!(config.writer.aliases["mehmet"], vec!["memo".to_string()]);
        assert_eq!(config.writer.checklist_name, "Checklist");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = GatewayConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = GatewayConfig::default();
        config.api_key = Some("k".into());
        config.default_board_id = Some("b9".into());
        config.save_to(&path).unwrap();

        let loaded = GatewayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("k"));
        assert_eq!(loaded.default_board_id.as_deref(), Some("b9"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = GatewayConfig {
            api_key: Some("from-file".into()),
            ..GatewayConfig::default()
        };
        config.apply_env(env(&[
            ("TRELLO_API_KEY", "from-env"),
            ("TRELLO_TOKEN", "tok"),
            ("DEFAULT_BOARD_ID", "b2"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.default_board_id.as_deref(), Some("b2"));
        assert!(config.credentials().is_ok());
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = GatewayConfig {
            token: Some("kept".into()),
            ..GatewayConfig::default()
        };
        config.apply_env(env(&[("TRELLO_TOKEN", "  ")]));
        assert_eq!(config.token.as_deref(), Some("kept"));
    }

    #[test]
    fn test_missing_credentials() {
        let config = GatewayConfig {
            token: Some("t".into()),
            ..GatewayConfig::default()
        };
        assert!(matches!(
            config.credentials(),
            Err(StoreError::MissingCredential("TRELLO_API_KEY"))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = GatewayConfig::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.limits.general.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
