use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MailerError;

/// Subject line for the welcome mail sent after signup.
pub const WELCOME_SUBJECT: &str = "Welcome";

/// Body of the welcome mail sent after signup.
pub fn welcome_body(display_name: &str) -> String {
    format!("Hello {display_name}, welcome to our service!")
}

/// SMTP settings for the welcome mailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Usher".to_string()
}

fn default_from_email() -> String {
    "no-reply@localhost".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from_name: default_from_name(),
            from_email: default_from_email(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Sends the welcome mail that follows a successful signup.
#[async_trait]
pub trait WelcomeMailer: Send + Sync {
    async fn send_welcome(&self, address: &str, display_name: &str) -> Result<(), MailerError>;
}

/// Type alias for a shareable mailer instance.
pub type DynWelcomeMailer = std::sync::Arc<dyn WelcomeMailer>;

/// SMTP-backed welcome mailer.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, MailerError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| MailerError::InvalidConfig(e.to_string()))?
            .port(settings.smtp_port)
            .timeout(Some(Duration::from_millis(settings.timeout_ms)));

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = format!("{} <{}>", settings.from_name, settings.from_email)
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl WelcomeMailer for SmtpMailer {
    async fn send_welcome(&self, address: &str, display_name: &str) -> Result<(), MailerError> {
        let to = address
            .parse::<Mailbox>()
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(WELCOME_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(welcome_body(display_name))
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;

        debug!(to = %address, "welcome mail sent");
        Ok(())
    }
}

/// Mailer that logs instead of sending. Used when mail is disabled.
pub struct NoopMailer;

#[async_trait]
impl WelcomeMailer for NoopMailer {
    async fn send_welcome(&self, address: &str, display_name: &str) -> Result<(), MailerError> {
        info!(to = %address, name = %display_name, "mail disabled, skipping welcome mail");
        Ok(())
    }
}

/// Creates a mailer from settings, falling back to the noop mailer
/// when mail delivery is disabled.
pub fn create_mailer(settings: &MailSettings) -> Result<DynWelcomeMailer, MailerError> {
    if !settings.enabled {
        return Ok(std::sync::Arc::new(NoopMailer));
    }
    Ok(std::sync::Arc::new(SmtpMailer::new(settings)?))
}
