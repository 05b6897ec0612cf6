//! Configuration and file management for reflux stores
//!
//! This crate provides:
//! - Directory utilities for config and cache files
//! - Configuration file loading (TOML)
//! - Store configuration (StoreConfig)

pub mod config_file;
pub mod paths;
pub mod store_config;

pub use config_file::{load_config_file, CONFIG_FILE};
pub use store_config::{LogFilterKind, StoreConfig};
