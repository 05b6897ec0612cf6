//! Keyed registry of in-flight effects
//!
//! Registration and removal share one lock, so "is this key live?" and
//! "claim this key" happen as a single step.

use super::{CancellationFlag, EffectId};
use crate::cancel_key::CancelKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct Entry {
    id: EffectId,
    flag: CancellationFlag,
}

/// Maps a cancellation key to the single effect running under it
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    entries: Arc<Mutex<HashMap<CancelKey, Entry>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for effect `id`
    ///
    /// Returns the flag the effect must observe, or `None` when another effect
    /// already holds the key.
    pub fn register(&self, key: &CancelKey, id: EffectId) -> Option<CancellationFlag> {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return None;
        }
        let flag = CancellationFlag::new();
        entries.insert(
            key.clone(),
            Entry {
                id,
                flag: flag.clone(),
            },
        );
        Some(flag)
    }

    /// Release `key` on behalf of effect `id`
    ///
    /// A no-op when the entry was already cancelled or now belongs to a newer
    /// effect started under the same key.
    pub fn complete(&self, key: &CancelKey, id: EffectId) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.id == id => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Raise the flag of the effect under `key` and forget it
    pub fn cancel(&self, key: &CancelKey) -> bool {
        let entry = self.entries.lock().remove(key);
        match entry {
            Some(entry) => {
                entry.flag.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every registered effect, returning how many were cancelled
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<Entry> = self.entries.lock().drain().map(|(_, entry)| entry).collect();
        for entry in &drained {
            entry.flag.cancel();
        }
        drained.len()
    }

    pub fn contains(&self, key: &CancelKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry_per_key() {
        let registry = TaskRegistry::new();
        let key = CancelKey::from("feed");

        assert!(registry.register(&key, EffectId::next()).is_some());
        assert!(registry.register(&key, EffectId::next()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_complete_releases_key() {
        let registry = TaskRegistry::new();
        let key = CancelKey::from("feed");
        let id = EffectId::next();

        registry.register(&key, id).unwrap();
        assert!(registry.complete(&key, id));
        assert!(!registry.complete(&key, id));
        assert!(registry.is_empty());
        assert!(registry.register(&key, EffectId::next()).is_some());
    }

    #[test]
    fn test_stale_completion_keeps_newer_entry() {
        let registry = TaskRegistry::new();
        let key = CancelKey::from(7u64);
        let old = EffectId::next();
        let new = EffectId::next();

        let old_flag = registry.register(&key, old).unwrap();
        assert!(registry.cancel(&key));
        assert!(old_flag.is_cancelled());

        registry.register(&key, new).unwrap();
        assert!(!registry.complete(&key, old));
        assert!(registry.contains(&key));
        assert!(registry.complete(&key, new));
    }

    #[test]
    fn test_cancel_unknown_key() {
        let registry = TaskRegistry::new();
        assert!(!registry.cancel(&CancelKey::from("missing")));
    }

    #[test]
    fn test_cancel_all() {
        let registry = TaskRegistry::new();
        let flags: Vec<_> = (0..3u64)
            .map(|i| registry.register(&CancelKey::from(i), EffectId::next()).unwrap())
            .collect();

        assert_eq!(registry.cancel_all(), 3);
        assert!(registry.is_empty());
        assert!(flags.iter().all(CancellationFlag::is_cancelled));
    }
}
