//! File-based blob cache for avatar payloads.
//!
//! This crate provides the filesystem implementation of the `BlobStore`
//! trait from `usher-storage`. Each entry is a file named
//! `{user_id}_avatar` under a configured cache directory.

mod cache;

pub use cache::FsBlobCache;
pub use usher_storage::{BlobStore, StorageError};

/// Type alias for a shareable blob store instance.
pub use usher_storage::DynBlobStore;

/// Creates a new shared filesystem blob cache rooted at `dir`.
///
/// Ensures the cache directory exists before handing the store out.
pub async fn create_blob_cache(
    dir: impl Into<std::path::PathBuf>,
) -> Result<DynBlobStore, StorageError> {
    let cache = FsBlobCache::new(dir);
    cache.init().await?;
    Ok(std::sync::Arc::new(cache))
}
