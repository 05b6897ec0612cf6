//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/reflux/`, `~/.cache/reflux/`
//! - macOS: `~/Library/Application Support/reflux/`, `~/Library/Caches/reflux/`
//! - Windows: `%APPDATA%\reflux\`, `%LOCALAPPDATA%\reflux\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "reflux";

/// Get the application config directory, creating it if missing
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    Ok(dir)
}

/// Get the application cache directory, creating it if missing
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(dir)
}

/// Directory holding persisted cache cells
pub fn store_cache_dir() -> Result<PathBuf> {
    Ok(cache_dir()?.join("store"))
}
