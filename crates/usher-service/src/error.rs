use thiserror::Error;

/// Failures surfaced by the avatar resolver.
///
/// The three kinds are mutually exclusive and checked in priority
/// order: a missing remote image is `NotFound`, any other remote
/// failure is `FetchFailed`, and storage faults on either tier are
/// `Unexpected`.
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Avatar not found")]
    NotFound,

    #[error("Failed to fetch avatar from directory: {0}")]
    FetchFailed(String),

    #[error("Unexpected avatar failure: {0}")]
    Unexpected(String),
}

impl AvatarError {
    #[must_use]
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::FetchFailed(message.into())
    }

    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Failures surfaced by the provisioning workflow.
///
/// Each variant names the phase that failed. A later-phase failure
/// never rolls back an earlier phase, so `Notification` and
/// `EventPublish` both mean the user record exists.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("User creation failed: {0}")]
    UserCreation(String),

    #[error("Welcome notification failed: {0}")]
    Notification(String),

    #[error("Signup event publish failed: {0}")]
    EventPublish(String),
}

impl ProvisionError {
    #[must_use]
    pub fn user_creation(message: impl Into<String>) -> Self {
        Self::UserCreation(message.into())
    }

    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    #[must_use]
    pub fn event_publish(message: impl Into<String>) -> Self {
        Self::EventPublish(message.into())
    }
}
