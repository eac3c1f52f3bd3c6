use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use usher_core::{AvatarRecord, NewUser, User, generate_id, now_utc};
use usher_storage::{RecordStore, StorageError};

/// In-memory record store backed by `DashMap`.
///
/// User and avatar records live in separate maps, both keyed by the
/// user id. All operations are single-key and rely on the map's
/// per-entry locking for atomicity.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    users: DashMap<String, User>,
    avatars: DashMap<String, AvatarRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            avatars: DashMap::new(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn avatar_count(&self) -> usize {
        self.avatars.len()
    }

    fn insert_user(&self, user: User) -> Result<User, StorageError> {
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::already_exists("user", user.id)),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let user = User {
            id: generate_id(),
            name: new_user.name,
            job: new_user.job,
            created_at: now_utc(),
        };
        self.insert_user(user)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn find_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError> {
        Ok(self
            .avatars
            .get(user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn put_avatar(&self, record: AvatarRecord) -> Result<AvatarRecord, StorageError> {
        self.avatars
            .insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn delete_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError> {
        Ok(self.avatars.remove(user_id).map(|(_, record)| record))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_assigns_id_and_timestamp() {
        let store = MemoryRecordStore::new();
        let before = now_utc();

        let user = store
            .create_user(NewUser::new("Jane", "Engineer"))
            .await
            .unwrap();

        assert!(uuid::Uuid::parse_str(&user.id).is_ok());
        assert_eq!(user.name, "Jane");
        assert_eq!(user.job, "Engineer");
        assert!(user.created_at >= before);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_find_user_roundtrip() {
        let store = MemoryRecordStore::new();
        let created = store
            .create_user(NewUser::new("Jane", "Engineer"))
            .await
            .unwrap();

        let found = store.find_user(&created.id).await.unwrap();
        assert_eq!(found, Some(created));

        let missing = store.find_user("nonexistent").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_id_conflicts() {
        let store = MemoryRecordStore::new();
        let user = User {
            id: "fixed-id".to_string(),
            name: "Jane".to_string(),
            job: "Engineer".to_string(),
            created_at: now_utc(),
        };

        store.insert_user(user.clone()).unwrap();
        let err = store.insert_user(user).unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_find_avatar_absent() {
        let store = MemoryRecordStore::new();
        let found = store.find_avatar("u1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_put_avatar_is_upsert() {
        let store = MemoryRecordStore::new();

        store
            .put_avatar(AvatarRecord::placeholder("u1"))
            .await
            .unwrap();
        let first = store.find_avatar("u1").await.unwrap().unwrap();
        assert!(!first.is_resolved());

        store
            .put_avatar(AvatarRecord::resolved("u1", "aGVsbG8="))
            .await
            .unwrap();
        let second = store.find_avatar("u1").await.unwrap().unwrap();
        assert!(second.is_resolved());
        assert_eq!(second.payload(), Some("aGVsbG8="));
        assert_eq!(store.avatar_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_avatar_returns_prior_record() {
        let store = MemoryRecordStore::new();
        store
            .put_avatar(AvatarRecord::resolved("u1", "aGVsbG8="))
            .await
            .unwrap();

        let removed = store.delete_avatar("u1").await.unwrap();
        assert_eq!(removed.and_then(|r| r.image_base64), Some("aGVsbG8=".to_string()));
        assert_eq!(store.avatar_count(), 0);

        let repeat = store.delete_avatar("u1").await.unwrap();
        assert!(repeat.is_none());
    }

    #[tokio::test]
    async fn test_avatars_keyed_independently_of_users() {
        let store = MemoryRecordStore::new();
        let user = store
            .create_user(NewUser::new("Jane", "Engineer"))
            .await
            .unwrap();

        assert!(store.find_avatar(&user.id).await.unwrap().is_none());

        store
            .put_avatar(AvatarRecord::resolved(&user.id, "cGF5bG9hZA=="))
            .await
            .unwrap();
        store.delete_avatar(&user.id).await.unwrap();

        // Deleting the avatar leaves the user record in place
        assert!(store.find_user(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_user_creation() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(MemoryRecordStore::new());
        let mut join_set = JoinSet::new();

        for i in 0..50 {
            let store_clone = Arc::clone(&store);
            join_set.spawn(async move {
                store_clone
                    .create_user(NewUser::new(format!("user-{i}"), "Engineer"))
                    .await
            });
        }

        let mut success_count = 0;
        while let Some(result) = join_set.join_next().await {
            if result.unwrap().is_ok() {
                success_count += 1;
            }
        }

        assert_eq!(success_count, 50);
        assert_eq!(store.user_count(), 50);
    }

    #[tokio::test]
    async fn test_concurrent_avatar_writes_last_wins() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(MemoryRecordStore::new());
        let mut join_set = JoinSet::new();

        for i in 0..20 {
            let store_clone = Arc::clone(&store);
            join_set.spawn(async move {
                store_clone
                    .put_avatar(AvatarRecord::resolved("shared", format!("payload-{i}")))
                    .await
            });
        }

        while let Some(result) = join_set.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        let record = store.find_avatar("shared").await.unwrap().unwrap();
        assert!(record.is_resolved());
        assert_eq!(store.avatar_count(), 1);
    }

    #[tokio::test]
    async fn test_backend_name() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.backend_name(), "memory");
    }
}
