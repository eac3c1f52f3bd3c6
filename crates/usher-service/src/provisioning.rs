use serde_json::json;
use tracing::info;

use usher_core::{NewUser, Signup, User};
use usher_gateways::{DynEventPublisher, DynWelcomeMailer};
use usher_storage::DynRecordStore;

use crate::error::ProvisionError;

/// Orchestrates user provisioning in three phases: persist the record,
/// send the welcome mail, publish the signup event.
///
/// Phases run in order and are never compensated. A phase failure
/// stops the workflow and surfaces as the matching `ProvisionError`
/// variant, leaving the effects of earlier phases in place.
pub struct ProvisioningService {
    records: DynRecordStore,
    mailer: DynWelcomeMailer,
    events: DynEventPublisher,
    topic: String,
}

impl ProvisioningService {
    pub fn new(
        records: DynRecordStore,
        mailer: DynWelcomeMailer,
        events: DynEventPublisher,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            records,
            mailer,
            events,
            topic: topic.into(),
        }
    }

    /// Provisions a user from a validated signup.
    ///
    /// The signup email addresses the welcome mail only; the persisted
    /// record carries name and job.
    pub async fn create(&self, signup: Signup) -> Result<User, ProvisionError> {
        let user = self
            .records
            .create_user(NewUser::from(&signup))
            .await
            .map_err(|e| ProvisionError::user_creation(e.to_string()))?;
        info!(user_id = %user.id, name = %user.name, "user record created");

        self.mailer
            .send_welcome(&signup.email, &user.name)
            .await
            .map_err(|e| ProvisionError::notification(e.to_string()))?;
        info!(user_id = %user.id, "welcome mail dispatched");

        self.events
            .publish(&self.topic, &json!({ "message": user.name }))
            .await
            .map_err(|e| ProvisionError::event_publish(e.to_string()))?;
        info!(user_id = %user.id, topic = %self.topic, "signup event published");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;
    use usher_core::AvatarRecord;
    use usher_db_memory::MemoryRecordStore;
    use usher_gateways::{EventPublisher, MailerError, PublishError, WelcomeMailer};
    use usher_storage::{RecordStore, StorageError};

    struct CapturingRecords {
        inner: Arc<MemoryRecordStore>,
        last_id: Mutex<Option<String>>,
    }

    impl CapturingRecords {
        fn new(inner: Arc<MemoryRecordStore>) -> Self {
            Self {
                inner,
                last_id: Mutex::new(None),
            }
        }

        fn last_id(&self) -> Option<String> {
            self.last_id.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for CapturingRecords {
        async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
            let user = self.inner.create_user(new_user).await?;
            *self.last_id.lock().unwrap() = Some(user.id.clone());
            Ok(user)
        }

        async fn find_user(&self, user_id: &str) -> Result<Option<User>, StorageError> {
            self.inner.find_user(user_id).await
        }

        async fn find_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError> {
            self.inner.find_avatar(user_id).await
        }

        async fn put_avatar(&self, record: AvatarRecord) -> Result<AvatarRecord, StorageError> {
            self.inner.put_avatar(record).await
        }

        async fn delete_avatar(&self, user_id: &str) -> Result<Option<AvatarRecord>, StorageError> {
            self.inner.delete_avatar(user_id).await
        }

        fn backend_name(&self) -> &'static str {
            "capturing"
        }
    }

    struct FailingRecords;

    #[async_trait]
    impl RecordStore for FailingRecords {
        async fn create_user(&self, _new_user: NewUser) -> Result<User, StorageError> {
            Err(StorageError::internal("record tier offline"))
        }

        async fn find_user(&self, _user_id: &str) -> Result<Option<User>, StorageError> {
            Ok(None)
        }

        async fn find_avatar(&self, _user_id: &str) -> Result<Option<AvatarRecord>, StorageError> {
            Ok(None)
        }

        async fn put_avatar(&self, record: AvatarRecord) -> Result<AvatarRecord, StorageError> {
            Ok(record)
        }

        async fn delete_avatar(
            &self,
            _user_id: &str,
        ) -> Result<Option<AvatarRecord>, StorageError> {
            Ok(None)
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    struct RecordingMailer {
        fail: bool,
        sent: AtomicUsize,
        last: Mutex<Option<(String, String)>>,
    }

    impl RecordingMailer {
        fn ok() -> Self {
            Self {
                fail: false,
                sent: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WelcomeMailer for RecordingMailer {
        async fn send_welcome(&self, address: &str, display_name: &str) -> Result<(), MailerError> {
            if self.fail {
                return Err(MailerError::SendFailed("relay down".to_string()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() =
                Some((address.to_string(), display_name.to_string()));
            Ok(())
        }
    }

    struct RecordingPublisher {
        fail: bool,
        published: AtomicUsize,
        last: Mutex<Option<(String, Value)>>,
    }

    impl RecordingPublisher {
        fn ok() -> Self {
            Self {
                fail: false,
                published: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn published_count(&self) -> usize {
            self.published.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
            if self.fail {
                return Err(PublishError::PublishFailed(
                    "endpoint returned status 500".to_string(),
                ));
            }
            self.published.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((topic.to_string(), payload.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_persists_notifies_and_publishes() {
        let store = Arc::new(MemoryRecordStore::new());
        let records = Arc::new(CapturingRecords::new(store.clone()));
        let mailer = Arc::new(RecordingMailer::ok());
        let events = Arc::new(RecordingPublisher::ok());
        let workflow = ProvisioningService::new(
            records.clone(),
            mailer.clone(),
            events.clone(),
            "user.created",
        );

        let signup = Signup::new("neo", "the one", "neo@matrix.io");
        let user = workflow.create(signup).await.unwrap();

        assert_eq!(user.name, "neo");
        assert_eq!(user.job, "the one");
        assert!(!user.id.is_empty());
        assert!(store.find_user(&user.id).await.unwrap().is_some());

        assert_eq!(mailer.sent_count(), 1);
        let (to, greeted) = mailer.last.lock().unwrap().clone().unwrap();
        assert_eq!(to, "neo@matrix.io");
        assert_eq!(greeted, "neo");

        assert_eq!(events.published_count(), 1);
        let (topic, payload) = events.last.lock().unwrap().clone().unwrap();
        assert_eq!(topic, "user.created");
        assert_eq!(payload, json!({ "message": "neo" }));
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal_and_skips_gateways() {
        let mailer = Arc::new(RecordingMailer::ok());
        let events = Arc::new(RecordingPublisher::ok());
        let workflow = ProvisioningService::new(
            Arc::new(FailingRecords),
            mailer.clone(),
            events.clone(),
            "user.created",
        );

        let err = workflow
            .create(Signup::new("neo", "the one", "neo@matrix.io"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::UserCreation(_)));
        assert_eq!(mailer.sent_count(), 0);
        assert_eq!(events.published_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_leaves_user_persisted() {
        let store = Arc::new(MemoryRecordStore::new());
        let records = Arc::new(CapturingRecords::new(store.clone()));
        let events = Arc::new(RecordingPublisher::ok());
        let workflow = ProvisioningService::new(
            records.clone(),
            Arc::new(RecordingMailer::failing()),
            events.clone(),
            "user.created",
        );

        let err = workflow
            .create(Signup::new("trinity", "operator", "trinity@matrix.io"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Notification(_)));
        // The record outlives the failed notification
        let user_id = records.last_id().unwrap();
        assert!(store.find_user(&user_id).await.unwrap().is_some());
        // Publication never runs after a notification failure
        assert_eq!(events.published_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_is_distinct_and_leaves_user_persisted() {
        let store = Arc::new(MemoryRecordStore::new());
        let records = Arc::new(CapturingRecords::new(store.clone()));
        let mailer = Arc::new(RecordingMailer::ok());
        let workflow = ProvisioningService::new(
            records.clone(),
            mailer.clone(),
            Arc::new(RecordingPublisher::failing()),
            "user.created",
        );

        let err = workflow
            .create(Signup::new("morpheus", "captain", "morpheus@matrix.io"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::EventPublish(_)));
        assert_eq!(mailer.sent_count(), 1);
        let user_id = records.last_id().unwrap();
        assert!(store.find_user(&user_id).await.unwrap().is_some());
    }
}
