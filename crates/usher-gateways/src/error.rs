use thiserror::Error;

/// Errors from the remote user directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Remote resource not found")]
    NotFound,

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Errors from the welcome mailer.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid mail configuration: {0}")]
    InvalidConfig(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Errors from the event publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid publisher configuration: {0}")]
    InvalidConfig(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),
}
