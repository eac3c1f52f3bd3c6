//! In-memory record store backend for the usher service.
//!
//! This crate provides an embedded implementation of the `RecordStore`
//! trait from `usher-storage`, backed by `DashMap` for concurrent access.
//! It suits tests and single-node deployments; a durable backend
//! implements the same trait.
//!
//! # Example
//!
//! ```ignore
//! use usher_db_memory::create_record_store;
//! use usher_core::NewUser;
//!
//! let store = create_record_store();
//! let user = store.create_user(NewUser::new("Jane", "Engineer")).await?;
//! ```

mod store;

// Re-export the storage traits for convenience
pub use usher_storage::{RecordStore, StorageError};

pub use store::MemoryRecordStore;

/// Type alias for a shareable record store instance.
pub use usher_storage::DynRecordStore;

/// Creates a new shared in-memory record store.
pub fn create_record_store() -> DynRecordStore {
    std::sync::Arc::new(MemoryRecordStore::new())
}
