use super::KeyValueStore;
use crate::debouncer::Debouncer;
use crate::error::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// A typed value persisted under one key with debounced write-behind
///
/// Reads never touch the backend after construction. Writes update memory
/// immediately and reach the backend once updates pause for the debounce
/// interval, so a burst of `set` calls costs a single save.
pub struct CacheCell<T> {
    key: Arc<str>,
    default: T,
    value: Arc<Mutex<T>>,
    backend: Arc<dyn KeyValueStore>,
    debouncer: Debouncer<T>,
}

impl<T: Clone> Clone for CacheCell<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            default: self.default.clone(),
            value: Arc::clone(&self.value),
            backend: Arc::clone(&self.backend),
            debouncer: self.debouncer.clone(),
        }
    }
}

impl<T> CacheCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Load `key` from `backend`, falling back to `default` when absent or unreadable
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        key: impl Into<String>,
        default: T,
        backend: Arc<dyn KeyValueStore>,
        debounce: Duration,
    ) -> Self {
        let key: Arc<str> = Arc::from(key.into());
        let initial = load(backend.as_ref(), &key).unwrap_or_else(|| default.clone());

        let debouncer = Debouncer::new(debounce);
        {
            let backend = Arc::clone(&backend);
            let key = Arc::clone(&key);
            debouncer.on_fire(move |value: T| {
                if let Err(e) = save(backend.as_ref(), &key, &value) {
                    log::debug!(
                        "CacheCell: write for '{}' dropped: {:#}",
                        key,
                        anyhow::Error::from(e)
                    );
                }
            });
        }

        Self {
            key,
            default,
            value: Arc::new(Mutex::new(initial)),
            backend,
            debouncer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Replace the value and schedule a write
    pub fn set(&self, value: T) {
        // Scheduled under the value lock so memory and the pending write agree.
        let mut current = self.value.lock();
        *current = value.clone();
        self.debouncer.receive(value);
    }

    /// Modify the value in place and schedule a write
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        let mut current = self.value.lock();
        f(&mut current);
        self.debouncer.receive(current.clone());
    }

    /// Restore the default, drop any pending write and remove the stored key
    pub fn reset(&self) {
        let mut current = self.value.lock();
        self.debouncer.cancel();
        *current = self.default.clone();
        if let Err(e) = self.backend.remove(&self.key) {
            log::debug!(
                "CacheCell: remove for '{}' failed: {:#}",
                self.key,
                anyhow::Error::from(e)
            );
        }
    }

    /// Write a pending value now instead of waiting for the interval
    pub fn flush(&self) -> bool {
        self.debouncer.flush()
    }

    /// Whether a write is waiting for its quiet period
    pub fn is_dirty(&self) -> bool {
        self.debouncer.is_pending()
    }
}

fn load<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> Option<T> {
    match backend.load(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("CacheCell: ignoring unreadable value for '{}': {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::debug!("CacheCell: load for '{}' failed: {:#}", key, anyhow::Error::from(e));
            None
        }
    }
}

fn save<T: Serialize>(
    backend: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    backend.save(key, &bytes)
}
