//! # usher-storage
//!
//! Persistence abstraction for the usher service.
//!
//! This crate defines the traits the authoritative record store and the
//! secondary blob cache implement. It does not contain any backends -
//! those are provided by separate crates (`usher-db-memory`,
//! `usher-blob-fs`).
//!
//! ## Overview
//!
//! [`RecordStore`] is the authoritative tier: user records and avatar
//! records live here, and every read is answered from it.
//!
//! [`BlobStore`] is the write-through blob tier: avatar payloads are
//! mirrored into it on resolution and removed on deletion, but it is
//! never consulted on the read path.

mod error;
mod traits;

// Re-export everything from submodules
pub use error::{ErrorCategory, StorageError};
pub use traits::{BlobStore, RecordStore};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared record store trait object.
pub type DynRecordStore = std::sync::Arc<dyn RecordStore>;

/// Type alias for a shared blob store trait object.
pub type DynBlobStore = std::sync::Arc<dyn BlobStore>;
