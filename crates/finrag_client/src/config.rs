//! Client config load/save for `~/.finrag/config.yaml`.
//! Every field is optional; accessors fall back to the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend origin used when no config overrides it.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Session id sent with every chat message unless configured otherwise.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Metrics polling period in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Env var that points at an alternative config file.
pub const CONFIG_ENV: &str = "FINRAG_CONFIG";

/// API section (base_url).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Chat section (session_id).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Metrics section (refresh_interval_secs).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,
}

/// Full client config.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub chat: ChatSection,
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn session_id(&self) -> &str {
        self.chat.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID)
    }

    /// Polling period for the metrics dashboard. Zero is treated as unset.
    pub fn refresh_interval(&self) -> Duration {
        let secs = match self.metrics.refresh_interval_secs {
            Some(s) if s > 0 => s,
            _ => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        Duration::from_secs(secs)
    }
}

/// Returns the default config file path: `~/.finrag/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".finrag").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, contents).map_err(io_err)
}

/// Resolve and load the config used by the binaries.
///
/// An explicit path (flag or `FINRAG_CONFIG`) must exist. The default path may
/// be absent, in which case the built-in defaults apply.
pub fn resolve(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }
    if let Some(val) = std::env::var_os(CONFIG_ENV) {
        return load(Path::new(&val));
    }
    match default_config_path() {
        Some(path) if path.exists() => load(&path),
        _ => {
            tracing::debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
