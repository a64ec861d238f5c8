//! Client Configuration
//!
//! Loads `OracleConfig` from a TOML file under the platform config
//! directory, then applies environment overrides. A missing file is not an
//! error — defaults point at a local backend. Configuration never fails
//! the process: unreadable files are logged and skipped.
//!
//! Environment overrides:
//! - `ORACLE_API_URL` — backend base URL
//! - `ORACLE_OFFLINE` — "1"/"true" switches to the in-memory mock backend
//! - `ORACLE_DATA_DIR` — directory for the token and profile cache files

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Errors from explicit config-file loads
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk config file shape; every field optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    offline: Option<bool>,
    data_dir: Option<PathBuf>,
}

/// Client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct OracleConfig {
    /// Backend base URL (no trailing slash)
    pub api_url: String,
    /// Use the in-memory mock backend instead of HTTP
    pub offline: bool,
    /// Directory for client-local state (token, profile cache)
    pub data_dir: PathBuf,
}

impl Default for OracleConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("oracle"))
            .unwrap_or_else(|| PathBuf::from(".oracle"));
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            offline: false,
            data_dir,
        }
    }
}

impl OracleConfig {
    /// Load from the default config path plus environment overrides
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Some(path) = default_config_path() {
            match Self::read_file(&path) {
                Ok(Some(file)) => config.apply_file(file),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring config file");
                }
            }
        }
        config.apply_env();
        config
    }

    /// Load from an explicit path (no environment overrides)
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the file is missing or malformed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw)?;
        let mut config = Self::default();
        config.apply_file(file);
        Ok(config)
    }

    /// Fixed path to the token file under `data_dir`
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token")
    }

    /// Fixed path to the profile cache file under `data_dir`
    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    fn read_file(path: &std::path::Path) -> Result<Option<ConfigFile>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Some(toml::from_str(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(api_url) = file.api_url {
            self.api_url = api_url;
        }
        if let Some(offline) = file.offline {
            self.offline = offline;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ORACLE_API_URL") {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(offline) = std::env::var("ORACLE_OFFLINE") {
            self.offline = matches!(offline.as_str(), "1" | "true" | "yes");
        }
        if let Ok(dir) = std::env::var("ORACLE_DATA_DIR") {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
    }
}

/// Default config file location: `<config dir>/oracle/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("oracle").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.offline);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://fit.example.com\"\noffline = true\n",
        )
        .unwrap();

        let config = OracleConfig::load_from_path(&path).unwrap();
        assert_eq!(config.api_url, "https://fit.example.com");
        assert!(config.offline);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [not toml").unwrap();
        assert!(matches!(
            OracleConfig::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_storage_paths_are_fixed_keys() {
        let mut config = OracleConfig::default();
        config.data_dir = PathBuf::from("/tmp/oracle-test");
        assert_eq!(config.token_path(), PathBuf::from("/tmp/oracle-test/token"));
        assert_eq!(
            config.profile_path(),
            PathBuf::from("/tmp/oracle-test/profile.json")
        );
    }
}
