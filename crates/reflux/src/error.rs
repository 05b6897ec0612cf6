//! Error types for the store and the persistence backends

use thiserror::Error;

/// Errors surfaced by [`Store`](crate::Store) requests that wait for the actor
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store actor has stopped and no longer accepts requests
    #[error("store is closed")]
    Closed,

    /// The actor dropped the request without answering it
    #[error("store dropped the {0} request")]
    Dropped(&'static str),
}

/// Errors raised by a [`KeyValueStore`](crate::cache::KeyValueStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o failure for cache key '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache value for key '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
