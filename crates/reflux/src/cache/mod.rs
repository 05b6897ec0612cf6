//! Debounced write-behind persistence
//!
//! A [`CacheCell`] pairs an in-memory value with a [`KeyValueStore`] backend
//! and a [`Debouncer`](crate::Debouncer), replacing field annotations with an
//! explicit object the owner constructs and holds.

mod cell;
mod storage;

pub use cell::CacheCell;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
