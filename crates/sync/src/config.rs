//! Configuration file support for skillhub.
//!
//! Loads settings from `~/.skillhub/config.toml` with the following precedence:
//! Environment variables > Config file > Defaults
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.skillhub/config.toml
//!
//! [sync]
//! # Tools that receive newly installed skills before the user picks any.
//! # Omit to default to every installed tool.
//! default_targets = ["claude_code", "codex"]
//!
//! [git_cache]
//! cleanup_days = 30
//! ttl_secs = 60
//!
//! [log]
//! filter = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CLEANUP_DAYS: u32 = 30;
pub const MAX_CLEANUP_DAYS: u32 = 3650;
pub const DEFAULT_TTL_SECS: u32 = 60;
pub const MAX_TTL_SECS: u32 = 3600;
const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub git_cache: GitCacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Initial sync targets; `None` means "all installed tools".
    pub default_targets: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct GitCacheConfig {
    pub cleanup_days: Option<u32>,
    pub ttl_secs: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    pub filter: Option<String>,
}

/// Clamps a cleanup interval into `0..=3650` days.
pub fn clamp_cleanup_days(days: i64) -> u32 {
    days.clamp(0, MAX_CLEANUP_DAYS as i64) as u32
}

/// Clamps a clone-cache TTL into `0..=3600` seconds.
pub fn clamp_ttl_secs(secs: i64) -> u32 {
    secs.clamp(0, MAX_TTL_SECS as i64) as u32
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir()
}

/// Returns the config file path (`SKILLHUB_CONFIG` or `~/.skillhub/config.toml`).
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("SKILLHUB_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    home_dir().map(|h| h.join(".skillhub").join("config.toml"))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but fails to parse.
pub fn load_config() -> Result<Option<HubConfig>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: HubConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    tracing::debug!(
        target: "skillhub::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

impl HubConfig {
    /// File settings (or defaults) with environment overrides applied.
    pub fn load() -> Result<Self> {
        let mut config = load_config()?.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var("SKILLHUB_DEFAULT_TARGETS") {
            let ids: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            self.sync.default_targets = Some(ids);
        }
        if let Ok(filter) = std::env::var("SKILLHUB_LOG") {
            if !filter.trim().is_empty() {
                self.log.filter = Some(filter);
            }
        }
    }

    pub fn default_targets(&self) -> Option<&[String]> {
        self.sync.default_targets.as_deref()
    }

    pub fn cleanup_days(&self) -> u32 {
        self.git_cache
            .cleanup_days
            .map(|d| clamp_cleanup_days(d as i64))
            .unwrap_or(DEFAULT_CLEANUP_DAYS)
    }

    pub fn ttl_secs(&self) -> u32 {
        self.git_cache
            .ttl_secs
            .map(|s| clamp_ttl_secs(s as i64))
            .unwrap_or(DEFAULT_TTL_SECS)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
