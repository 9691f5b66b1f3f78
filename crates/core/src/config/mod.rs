//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGETEXT_*)
//! 2. TOML config file (`--config`, or PAGETEXT_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod strategies;
mod validation;

pub use strategies::{DecoderKind, StrategyConfig, builtin_strategies};
pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGETEXT_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// First-stage readiness timeout (T1) in milliseconds.
    ///
    /// Set via PAGETEXT_ONLOAD_TIMEOUT_MS environment variable.
    #[serde(default = "default_onload_timeout_ms")]
    pub onload_timeout_ms: u64,

    /// Total readiness timeout (T2) in milliseconds, expected to be >= T1.
    ///
    /// Set via PAGETEXT_TOTAL_TIMEOUT_MS environment variable.
    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,

    /// Upper bound on navigation until the main document response arrives.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Run the browser without a visible window.
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// User-Agent override for the browser and raw downloads.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Explicit Chrome/Chromium binary; detected when unset.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Timeout for raw byte downloads made by content-type strategies.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum body size for raw byte downloads.
    #[serde(default = "default_fetch_max_bytes")]
    pub fetch_max_bytes: usize,

    /// Strategy table entries. A config file that sets this replaces the built-ins.
    #[serde(default = "builtin_strategies")]
    pub strategies: Vec<StrategyConfig>,
}

fn default_onload_timeout_ms() -> u64 {
    5_000
}

fn default_total_timeout_ms() -> u64 {
    12_000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_fetch_max_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            onload_timeout_ms: default_onload_timeout_ms(),
            total_timeout_ms: default_total_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            headless: true,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            user_agent: None,
            chrome_executable: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            fetch_max_bytes: default_fetch_max_bytes(),
            strategies: builtin_strategies(),
        }
    }
}

impl AppConfig {
    pub fn onload_timeout(&self) -> Duration {
        Duration::from_millis(self.onload_timeout_ms)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGETEXT_`
    /// 2. TOML file from `config_file`, else from `PAGETEXT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// The result is not validated; call [`AppConfig::validate`] once any
    /// command-line overrides have been applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(config_file)
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }

    fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let env_file = std::env::var_os("PAGETEXT_CONFIG_FILE").map(PathBuf::from);
        if let Some(path) = config_file.map(Path::to_path_buf).or(env_file) {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(
            Env::prefixed("PAGETEXT_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
