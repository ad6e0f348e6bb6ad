//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. a `--config` flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//!
//! Every key is optional. With no file at all, [`Config::default()`] applies.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::retry::RetryConfig;
use crate::tracker::TrackerConfig;
use crate::{HuginnError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub tracker: TrackerSection,
}

/// `[cache]`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry time-to-live in seconds (default: 86400, one day).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum entries before the oldest are evicted (default: 1000).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Seconds between expired-entry sweeps; 0 disables (default: 300).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.ttl_secs))
            .max_entries(self.max_entries)
    }

    /// Sweep interval, `None` when disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

fn default_ttl_secs() -> u64 {
    24 * 3600
}

fn default_max_entries() -> usize {
    1_000
}

fn default_sweep_interval() -> u64 {
    300
}

/// `[generation]`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSection {
    /// Overall bound per upstream phase, in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Content-suitability threshold in characters (default: 50).
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_min_content_chars() -> usize {
    crate::fallback::MIN_CONTENT_CHARS
}

/// `[retry]`
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds (default: 500).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff cap in milliseconds (default: 10000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySection {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

/// `[tracker]`
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSection {
    /// How long an uncompleted record is kept, in seconds (default: 600).
    #[serde(default = "default_record_ttl")]
    pub record_ttl_secs: u64,
    /// Maximum in-flight records (default: 10000).
    #[serde(default = "default_max_records")]
    pub max_records: u64,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            record_ttl_secs: default_record_ttl(),
            max_records: default_max_records(),
        }
    }
}

impl TrackerSection {
    pub fn to_tracker_config(&self) -> TrackerConfig {
        TrackerConfig::new()
            .record_ttl(Duration::from_secs(self.record_ttl_secs))
            .max_records(self.max_records)
    }
}

fn default_record_ttl() -> u64 {
    600
}

fn default_max_records() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error. Without an explicit
    /// path and with no file in the standard locations, defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HuginnError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
