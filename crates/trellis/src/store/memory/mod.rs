//! In-memory storage backend.
//!
//! State lives in [`MemoryStoreInner`] behind `Arc<Mutex<_>>` so the store
//! can be shared across async tasks; every trait method takes the lock once
//! and works on a consistent view.

mod inner;
mod trait_impl;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use inner::MemoryStoreInner;

/// Shared handle to an in-memory store.
pub type MemoryStore = Arc<Mutex<MemoryStoreInner>>;

/// A fresh, empty in-memory store stamping ids with `prefix`.
#[must_use]
pub fn new_memory_store(prefix: &str) -> MemoryStore {
    Arc::new(Mutex::new(MemoryStoreInner::new(prefix)))
}
