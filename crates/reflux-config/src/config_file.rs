use std::{env, path::Path, path::PathBuf};

pub const CONFIG_FILE: &str = ".reflux.toml";

/// Load config file content from CWD first, then home directory
///
/// Searches for .reflux.toml in:
/// 1. Current working directory
/// 2. Home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    if let Some(content) = read_config(Path::new(CONFIG_FILE)) {
        return Some(content);
    }

    get_home_config_path().and_then(|home_config| read_config(&home_config))
}

/// Read a config file, treating a missing or unreadable file as absent
pub fn read_config(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(e) => {
            log::trace!("No config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Returns ~/.reflux.toml if HOME environment variable is set.
fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
