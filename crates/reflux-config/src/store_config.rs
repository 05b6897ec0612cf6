//! Store configuration
//!
//! Configuration loaded from .reflux.toml file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which actions reach the action logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFilterKind {
    #[default]
    All,
    DebugOnly,
    ErrorsOnly,
}

/// Store configuration loaded from .reflux.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Install the action logging sink
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,

    #[serde(default)]
    pub log_filter: LogFilterKind,

    /// Write-behind interval for cache cells, in milliseconds
    #[serde(default = "default_cache_debounce_ms")]
    pub cache_debounce_ms: u64,

    /// Settle interval for debounced input, in milliseconds
    #[serde(default = "default_input_debounce_ms")]
    pub input_debounce_ms: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_initial_page")]
    pub initial_page: u32,

    /// Override of the persistence directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_log_actions() -> bool {
    true
}

fn default_cache_debounce_ms() -> u64 {
    500
}

fn default_input_debounce_ms() -> u64 {
    300
}

fn default_page_size() -> usize {
    20
}

fn default_initial_page() -> u32 {
    1
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_actions: default_log_actions(),
            log_filter: LogFilterKind::default(),
            cache_debounce_ms: default_cache_debounce_ms(),
            input_debounce_ms: default_input_debounce_ms(),
            page_size: default_page_size(),
            initial_page: default_initial_page(),
            cache_dir: None,
        }
    }
}

impl StoreConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        match crate::load_config_file() {
            Some(content) => Self::parse_or_default(&content),
            None => {
                log::debug!("Using default store config");
                Self::default()
            }
        }
    }

    /// Parse TOML content, falling back to defaults on malformed input
    pub fn parse_or_default(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                log::info!("Loaded store config from file");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn cache_debounce(&self) -> Duration {
        Duration::from_millis(self.cache_debounce_ms)
    }

    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }

    /// The configured persistence directory, or the platform cache directory
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => crate::paths::store_cache_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.log_actions);
        assert_eq!(config.log_filter, LogFilterKind::All);
        assert_eq!(config.cache_debounce(), Duration::from_millis(500));
        assert_eq!(config.input_debounce(), Duration::from_millis(300));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.initial_page, 1);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            log_filter = "errors_only"
            page_size = 50
        "#;
        let config: StoreConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.log_filter, LogFilterKind::ErrorsOnly);
        assert_eq!(config.page_size, 50);
        // Other fields should use defaults
        assert!(config.log_actions);
        assert_eq!(config.cache_debounce_ms, 500);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let config = StoreConfig::parse_or_default("page_size = \"many\"");
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_cache_dir_override() {
        let config = StoreConfig::parse_or_default("cache_dir = \"/tmp/reflux-test\"");
        assert_eq!(
            config.resolved_cache_dir().unwrap(),
            PathBuf::from("/tmp/reflux-test")
        );
    }
}
