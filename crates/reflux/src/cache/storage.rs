//! Key/value persistence backends
//!
//! Last writer wins per key, nothing more. Writers treat failures as
//! fire-and-forget; readers treat them as an absent value.

use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Byte-oriented store keyed by string
pub trait KeyValueStore: Send + Sync {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process backend, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the backing directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a key to a file name, replacing anything outside `[A-Za-z0-9._-]`
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.cache", name))
    }
}

fn io_error(key: &str, source: io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("cache.tmp");
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))?;
        log::debug!("FileStore: saved {} bytes for '{}'", value.len(), key);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("k").unwrap().is_none());

        store.save("k", b"one").unwrap();
        store.save("k", b"two").unwrap();
        assert_eq!(store.load("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.save("settings", b"{\"a\":1}").unwrap();
        store.save("settings", b"{\"a\":2}").unwrap();

        assert_eq!(store.load("settings").unwrap(), Some(b"{\"a\":2}".to_vec()));
    }

    #[test]
    fn test_file_store_missing_key_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert!(store.load("nothing").unwrap().is_none());
        store.remove("nothing").unwrap();
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested")).unwrap();

        store.save("../escape/attempt", b"x").unwrap();

        assert!(store.dir().join(".._escape_attempt.cache").exists());
        assert_eq!(store.load("../escape/attempt").unwrap(), Some(b"x".to_vec()));
        store.remove("../escape/attempt").unwrap();
        assert!(store.load("../escape/attempt").unwrap().is_none());
    }
}
