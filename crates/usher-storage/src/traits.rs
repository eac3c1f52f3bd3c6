//! Storage traits for the usher persistence layer.
//!
//! This module defines the contracts the record store and blob cache
//! backends must implement.

use async_trait::async_trait;

use crate::error::StorageError;
use usher_core::{AvatarRecord, NewUser, User};

/// The authoritative store for user and avatar records.
///
/// Absence is expressed as `Ok(None)`; errors are reserved for
/// infrastructure faults. Implementations must be thread-safe
/// (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use usher_storage::{RecordStore, StorageError};
/// use usher_core::AvatarRecord;
///
/// async fn cached_avatar(
///     store: &dyn RecordStore,
///     user_id: &str,
/// ) -> Result<Option<AvatarRecord>, StorageError> {
///     store.find_avatar(user_id).await
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a new user record, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a record with the same id
    /// is already present.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError>;

    /// Reads a user record by id.
    ///
    /// Returns `None` if the user does not exist.
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StorageError>;

    /// Reads the avatar record for a user.
    ///
    /// Returns `None` if no record exists. A returned record may still be
    /// an unresolved placeholder; callers decide what counts as a hit.
    async fn find_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError>;

    /// Inserts or replaces the avatar record for a user.
    ///
    /// Setting the payload and marking the record resolved is a single
    /// upsert; there is no separate flag write.
    async fn put_avatar(&self, record: AvatarRecord) -> Result<AvatarRecord, StorageError>;

    /// Removes the avatar record for a user, returning the prior record.
    ///
    /// Returns `None` if no record existed. Removal and retrieval are one
    /// atomic step.
    async fn delete_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// The secondary blob tier for avatar payloads.
///
/// The blob cache is a performance artifact only. Reads are never served
/// from it, so the trait exposes no read operation; the record store
/// stays authoritative.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Durably writes the payload for a user, replacing any prior entry.
    async fn write(&self, user_id: &str, payload: &[u8]) -> Result<(), StorageError>;

    /// Removes the entry for a user.
    ///
    /// Deleting an absent entry is a success, so the tiers converge even
    /// when they are out of sync.
    async fn delete(&self, user_id: &str) -> Result<(), StorageError>;

    /// Returns whether an entry currently exists for a user.
    async fn exists(&self, user_id: &str) -> Result<bool, StorageError>;
}

// Ensure traits are object-safe by using them as trait objects
#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that RecordStore is object-safe
    fn _assert_record_store_object_safe(_: &dyn RecordStore) {}

    // Compile-time test that BlobStore is object-safe
    fn _assert_blob_store_object_safe(_: &dyn BlobStore) {}
}
