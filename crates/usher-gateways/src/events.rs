use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::Sha256;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::PublishError;

type HmacSha256 = Hmac<Sha256>;

/// Default topic for signup events.
pub const SIGNUP_TOPIC: &str = "user.created";

/// Settings for the signup event publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_topic() -> String {
    SIGNUP_TOPIC.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for EventsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            topic: default_topic(),
            secret: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Publishes domain events to downstream consumers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError>;
}

/// Type alias for a shareable publisher instance.
pub type DynEventPublisher = std::sync::Arc<dyn EventPublisher>;

/// Delivers events to an HTTP endpoint, optionally signing each
/// delivery with an HMAC-SHA256 secret.
#[derive(Debug)]
pub struct WebhookPublisher {
    client: Client,
    endpoint: String,
    secret: Option<String>,
}

impl WebhookPublisher {
    pub fn new(settings: &EventsSettings) -> Result<Self, PublishError> {
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or_else(|| PublishError::InvalidConfig("Missing webhook endpoint".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| PublishError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            secret: settings.secret.clone(),
        })
    }

    fn sign_payload(secret: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl EventPublisher for WebhookPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let envelope = json!({
            "topic": topic,
            "payload": payload,
            "timestamp": timestamp,
        });
        let body = serde_json::to_string(&envelope)
            .map_err(|e| PublishError::PublishFailed(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(secret) = &self.secret {
            let signature = Self::sign_payload(secret, &body);
            request = request.header("X-Signature-256", format!("sha256={signature}"));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| PublishError::PublishFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::PublishFailed(format!(
                "endpoint returned status {}",
                response.status().as_u16()
            )));
        }

        debug!(topic = %topic, "event delivered");
        Ok(())
    }
}

/// Publisher that logs instead of delivering. Used when events are disabled.
pub struct LogOnlyPublisher;

#[async_trait]
impl EventPublisher for LogOnlyPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
        info!(topic = %topic, payload = %payload, "events disabled, skipping delivery");
        Ok(())
    }
}

/// Creates a publisher from settings, falling back to the log-only
/// publisher when event delivery is disabled.
pub fn create_publisher(settings: &EventsSettings) -> Result<DynEventPublisher, PublishError> {
    if !settings.enabled {
        return Ok(std::sync::Arc::new(LogOnlyPublisher));
    }
    Ok(std::sync::Arc::new(WebhookPublisher::new(settings)?))
}
