//! Type-erased cancellation keys
//!
//! Effects are identified by a caller-chosen key. Any `Eq + Hash + Debug` value
//! can serve as a key; the concrete type takes part in equality and hashing, so
//! `1u64` and `"1"` never name the same effect.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

trait DynKey: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<K> DynKey for K
where
    K: Any + Eq + Hash + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// Opaque, cheaply cloneable cancellation key
#[derive(Clone)]
pub struct CancelKey(Arc<dyn DynKey>);

impl CancelKey {
    /// Wrap any hashable value as a cancellation key
    pub fn new<K>(key: K) -> Self
    where
        K: Any + Eq + Hash + fmt::Debug + Send + Sync,
    {
        Self(Arc::new(key))
    }

    /// Borrow the wrapped value if it has type `K`
    pub fn downcast_ref<K: Any>(&self) -> Option<&K> {
        self.0.as_any().downcast_ref::<K>()
    }

    /// Check whether the wrapped value has type `K`
    pub fn is<K: Any>(&self) -> bool {
        self.0.as_any().is::<K>()
    }
}

impl PartialEq for CancelKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for CancelKey {}

impl Hash for CancelKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_any().type_id().hash(state);
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for CancelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CancelKey({:?})", self.0)
    }
}

impl From<&'static str> for CancelKey {
    fn from(key: &'static str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CancelKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<u64> for CancelKey {
    fn from(key: u64) -> Self {
        Self::new(key)
    }
}

impl From<u32> for CancelKey {
    fn from(key: u32) -> Self {
        Self::new(key)
    }
}

impl From<usize> for CancelKey {
    fn from(key: usize) -> Self {
        Self::new(key)
    }
}
