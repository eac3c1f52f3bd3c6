use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use usher_storage::{BlobStore, StorageError};

/// Filesystem-backed blob cache rooted at a configured directory.
///
/// Writes go through a temporary file in the same directory followed by
/// a rename, so a crashed write never leaves a torn entry behind.
#[derive(Debug, Clone)]
pub struct FsBlobCache {
    root: PathBuf,
}

impl FsBlobCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Initialize the cache by ensuring the cache directory exists.
    pub async fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(self.root.display().to_string(), e))?;
        info!(cache_dir = %self.root.display(), "blob cache initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache entry name for a user id.
    pub fn entry_name(user_id: &str) -> String {
        format!("{user_id}_avatar")
    }

    /// Resolves the entry path, rejecting keys that would escape the
    /// cache directory.
    fn entry_path(&self, user_id: &str) -> Result<PathBuf, StorageError> {
        if user_id.is_empty() || user_id.contains(['/', '\\']) || user_id.contains("..") {
            return Err(StorageError::invalid_key(user_id));
        }
        Ok(self.root.join(Self::entry_name(user_id)))
    }
}

#[async_trait]
impl BlobStore for FsBlobCache {
    async fn write(&self, user_id: &str, payload: &[u8]) -> Result<(), StorageError> {
        let dest = self.entry_path(user_id)?;
        let tmp = self.root.join(format!(
            ".{}.{}.tmp",
            Self::entry_name(user_id),
            uuid::Uuid::new_v4()
        ));

        fs::write(&tmp, payload)
            .await
            .map_err(|e| StorageError::io(tmp.display().to_string(), e))?;

        if let Err(e) = fs::rename(&tmp, &dest).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StorageError::io(dest.display().to_string(), e));
        }

        debug!(key = %Self::entry_name(user_id), size = payload.len(), "cached blob");
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StorageError> {
        let path = self.entry_path(user_id)?;
        if !self.exists(user_id).await? {
            return Ok(());
        }
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %Self::entry_name(user_id), "removed blob");
                Ok(())
            }
            // The entry can vanish between the check and the remove
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    async fn exists(&self, user_id: &str) -> Result<bool, StorageError> {
        let path = self.entry_path(user_id)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::io(path.display().to_string(), e))
    }
}
