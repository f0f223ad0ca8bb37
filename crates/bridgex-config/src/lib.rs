//! Configuration for the BridgeX client.
//!
//! Serialized defaults, overlaid by a TOML file from the platform config
//! directory, overlaid by `BRIDGEX_*` environment variables. The result is
//! translated into `bridgex_core::ControllerConfig`. This crate only reads;
//! the client never writes configuration back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bridgex_core::ControllerConfig;

/// Environment variable prefix, e.g. `BRIDGEX_BACKEND_URL`.
pub const ENV_PREFIX: &str = "BRIDGEX_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Client configuration as stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backend root URL.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Name announced to the remote device when pairing.
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,

    /// Background refresh period in seconds; 0 disables it.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_pairing_refresh_delay_ms")]
    pub pairing_refresh_delay_ms: u64,

    /// Launch this backend binary on startup instead of expecting one to
    /// be running already.
    #[serde(default)]
    pub backend_binary: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            device_name: default_device_name(),
            timeout_secs: default_timeout_secs(),
            startup_grace_ms: default_startup_grace_ms(),
            refresh_interval_secs: default_refresh_interval_secs(),
            pairing_refresh_delay_ms: default_pairing_refresh_delay_ms(),
            backend_binary: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_device_name() -> String {
    "Desktop PC".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_startup_grace_ms() -> u64 {
    2_000
}
fn default_refresh_interval_secs() -> u64 {
    30
}
fn default_pairing_refresh_delay_ms() -> u64 {
    1_000
}

impl Config {
    /// Translate into the controller's runtime configuration.
    pub fn to_controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let backend_url =
            url::Url::parse(&self.backend_url).map_err(|e| ConfigError::Validation {
                field: "backend_url".into(),
                reason: format!("{e}: {}", self.backend_url),
            })?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "backend_url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.backend_url),
            });
        }
        if self.device_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "device_name".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        let mut config = ControllerConfig::new(backend_url);
        config.device_name.clone_from(&self.device_name);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.startup_grace = Duration::from_millis(self.startup_grace_ms);
        config.refresh_interval = Duration::from_secs(self.refresh_interval_secs);
        config.pairing_refresh_delay = Duration::from_millis(self.pairing_refresh_delay_ms);
        Ok(config)
    }

    /// Port the backend should listen on, taken from `backend_url`.
    pub fn backend_port(&self) -> Option<u16> {
        url::Url::parse(&self.backend_url)
            .ok()
            .and_then(|u| u.port_or_known_default())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bridgex", "bridgex").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bridgex");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the default path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` plus environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}
