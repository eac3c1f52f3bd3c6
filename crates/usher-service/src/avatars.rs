use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, info};

use usher_core::AvatarRecord;
use usher_gateways::{DirectoryError, DynUserDirectory};
use usher_storage::{DynBlobStore, DynRecordStore};

use crate::error::AvatarError;

/// Read-through avatar resolver over the record store, the blob cache
/// and the remote user directory.
///
/// The record store is authoritative: a hit is answered from it alone,
/// and on a miss both tiers are populated, blob cache first. Reads are
/// never served from the blob cache.
pub struct AvatarService {
    records: DynRecordStore,
    blobs: DynBlobStore,
    directory: DynUserDirectory,
}

impl AvatarService {
    pub fn new(records: DynRecordStore, blobs: DynBlobStore, directory: DynUserDirectory) -> Self {
        Self {
            records,
            blobs,
            directory,
        }
    }

    /// Resolves the base64 avatar payload for a user.
    ///
    /// A stored record with a non-empty payload is returned without any
    /// remote call. Otherwise the image is fetched from the directory,
    /// encoded, written to the blob cache and then upserted into the
    /// record store. A blob write failure aborts before the record
    /// write so the record store never points at a payload the blob
    /// tier failed to take.
    pub async fn resolve(&self, user_id: &str) -> Result<String, AvatarError> {
        let cached = self
            .records
            .find_avatar(user_id)
            .await
            .map_err(|e| AvatarError::unexpected(e.to_string()))?;

        if let Some(payload) = cached.as_ref().and_then(AvatarRecord::payload) {
            debug!(user_id = %user_id, "avatar served from record store");
            return Ok(payload.to_string());
        }

        let bytes = self
            .directory
            .fetch_avatar(user_id)
            .await
            .map_err(|e| match e {
                DirectoryError::NotFound => AvatarError::NotFound,
                other => AvatarError::fetch_failed(other.to_string()),
            })?;

        let encoded = STANDARD.encode(&bytes);

        self.blobs
            .write(user_id, encoded.as_bytes())
            .await
            .map_err(|e| AvatarError::unexpected(e.to_string()))?;

        self.records
            .put_avatar(AvatarRecord::resolved(user_id, &encoded))
            .await
            .map_err(|e| AvatarError::unexpected(e.to_string()))?;

        info!(user_id = %user_id, bytes = encoded.len(), "avatar resolved and cached");
        Ok(encoded)
    }

    /// Deletes the cached avatar from both tiers, blob cache first.
    ///
    /// The record store decides existence: if it held no record the
    /// result is `NotFound`, whatever the blob tier contained. A record
    /// delete failure after the blob delete is not compensated; the
    /// next successful resolve repopulates both tiers.
    pub async fn delete(&self, user_id: &str) -> Result<(), AvatarError> {
        self.blobs
            .delete(user_id)
            .await
            .map_err(|e| AvatarError::unexpected(e.to_string()))?;

        match self.records.delete_avatar(user_id).await {
            Ok(Some(_)) => {
                info!(user_id = %user_id, "avatar deleted");
                Ok(())
            }
            Ok(None) => Err(AvatarError::NotFound),
            Err(e) => Err(AvatarError::unexpected(e.to_string())),
        }
    }
}
