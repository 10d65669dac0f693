//! Configuration file loading with precedence handling.

use crate::source::memory::DEFAULT_PAGE_SIZE;
use crate::state::FailedSendPolicy;
use crate::view::constants::DEFAULT_TOP_THRESHOLD;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CONVSYNC_CONFIG";
/// Environment variable overriding the simulated backend latency.
pub const LATENCY_ENV: &str = "CONVSYNC_LATENCY_MS";
/// Environment variable overriding the failed-send policy.
pub const FAILED_SENDS_ENV: &str = "CONVSYNC_FAILED_SENDS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/convsync/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Messages per history page served by the simulated backend.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Rows from the top of the thread that trigger an older-page load.
    #[serde(default)]
    pub top_threshold: Option<usize>,

    /// Timeout for each history fetch and send, in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Simulated network latency, in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<u64>,

    /// `"discard"` or `"retain"`.
    #[serde(default)]
    pub failed_sends: Option<FailedSendPolicy>,

    /// Whether the simulated contact replies to every send.
    #[serde(default)]
    pub auto_reply: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Always at least 1.
    pub page_size: usize,
    pub top_threshold: usize,
    pub request_timeout_ms: u64,
    pub latency_ms: u64,
    pub failed_sends: FailedSendPolicy,
    pub auto_reply: bool,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            top_threshold: DEFAULT_TOP_THRESHOLD,
            request_timeout_ms: 10_000,
            latency_ms: 150,
            failed_sends: FailedSendPolicy::default(),
            auto_reply: false,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/convsync/convsync.log` on Linux, or the
/// platform's state directory elsewhere. Falls back to the current
/// directory if no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("convsync").join("convsync.log")
    } else {
        PathBuf::from("convsync.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("convsync").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CONVSYNC_CONFIG` environment variable
/// 3. Default path `~/.config/convsync/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `CONVSYNC_CONFIG` is set to a non-UTF-8 value.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CONVSYNC_LATENCY_MS`: simulated latency in milliseconds
/// - `CONVSYNC_FAILED_SENDS`: `discard` or `retain`
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(LATENCY_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(latency) => config.latency_ms = latency,
            Err(error) => warn!(value = %raw, %error, "Ignoring {LATENCY_ENV}"),
        }
    }

    if let Ok(raw) = std::env::var(FAILED_SENDS_ENV) {
        match FailedSendPolicy::parse(raw.trim()) {
            Some(policy) => config.failed_sends = policy,
            None => warn!(value = %raw, "Ignoring {FAILED_SENDS_ENV}"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        page_size: config.page_size.unwrap_or(defaults.page_size).max(1),
        top_threshold: config.top_threshold.unwrap_or(defaults.top_threshold),
        request_timeout_ms: config
            .request_timeout_ms
            .unwrap_or(defaults.request_timeout_ms),
        latency_ms: config.latency_ms.unwrap_or(defaults.latency_ms),
        failed_sends: config.failed_sends.unwrap_or(defaults.failed_sends),
        auto_reply: config.auto_reply.unwrap_or(defaults.auto_reply),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    latency_override: Option<u64>,
    auto_reply_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(latency) = latency_override {
        config.latency_ms = latency;
    }

    if let Some(auto_reply) = auto_reply_override {
        config.auto_reply = auto_reply;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
