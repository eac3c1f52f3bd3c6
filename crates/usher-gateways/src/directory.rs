use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::DirectoryError;

/// Settings for the remote user directory client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://reqres.in".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Remote directory that owns canonical user profiles and avatar images.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches the remote profile document for a user.
    async fn fetch_user(&self, user_id: &str) -> Result<Value, DirectoryError>;

    /// Fetches the raw avatar image bytes for a user.
    async fn fetch_avatar(&self, user_id: &str) -> Result<Vec<u8>, DirectoryError>;
}

/// Type alias for a shareable user directory instance.
pub type DynUserDirectory = std::sync::Arc<dyn UserDirectory>;

/// HTTP client for the remote user directory.
///
/// Every request is bounded by the configured timeout; a timeout
/// surfaces as `DirectoryError::Transport`.
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(settings: &DirectorySettings) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/api/users/{user_id}", self.base_url)
    }

    fn avatar_url(&self, user_id: &str) -> String {
        format!("{}/img/faces/{user_id}-image.jpg", self.base_url)
    }
}

/// Creates a shared directory client from settings.
pub fn create_directory(settings: &DirectorySettings) -> Result<DynUserDirectory, DirectoryError> {
    Ok(std::sync::Arc::new(HttpUserDirectory::new(settings)?))
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn fetch_user(&self, user_id: &str) -> Result<Value, DirectoryError> {
        let url = self.user_url(user_id);
        debug!(url = %url, "fetching remote user");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<Value>()
                .await
                .map_err(|e| DirectoryError::Transport(e.to_string())),
            StatusCode::NOT_FOUND => Err(DirectoryError::NotFound),
            status => Err(DirectoryError::UpstreamStatus(status.as_u16())),
        }
    }

    async fn fetch_avatar(&self, user_id: &str) -> Result<Vec<u8>, DirectoryError> {
        let url = self.avatar_url(user_id);
        debug!(url = %url, "fetching remote avatar");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|e| DirectoryError::Transport(e.to_string())),
            StatusCode::NOT_FOUND => Err(DirectoryError::NotFound),
            status => Err(DirectoryError::UpstreamStatus(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> DirectorySettings {
        DirectorySettings {
            base_url: server.uri(),
            timeout_ms: 2_000,
        }
    }

    #[test]
    fn test_url_layout() {
        let directory = HttpUserDirectory::new(&DirectorySettings {
            base_url: "https://reqres.in/".to_string(),
            timeout_ms: 1_000,
        })
        .unwrap();

        assert_eq!(directory.user_url("7"), "https://reqres.in/api/users/7");
        assert_eq!(
            directory.avatar_url("7"),
            "https://reqres.in/img/faces/7-image.jpg"
        );
    }

    #[tokio::test]
    async fn test_fetch_user_returns_remote_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 2, "first_name": "Janet"}
            })))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(&settings_for(&server)).unwrap();
        let doc = directory.fetch_user("2").await.unwrap();
        assert_eq!(doc["data"]["first_name"], "Janet");
    }

    #[tokio::test]
    async fn test_fetch_user_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(&settings_for(&server)).unwrap();
        let err = directory.fetch_user("999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_user_maps_5xx_to_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(&settings_for(&server)).unwrap();
        let err = directory.fetch_user("2").await.unwrap_err();
        assert!(matches!(err, DirectoryError::UpstreamStatus(503)));
    }

    #[tokio::test]
    async fn test_fetch_avatar_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/faces/2-image.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(&settings_for(&server)).unwrap();
        let bytes = directory.fetch_avatar("2").await.unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_fetch_avatar_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/faces/999-image.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let directory = HttpUserDirectory::new(&settings_for(&server)).unwrap();
        let err = directory.fetch_avatar("999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Reserved TEST-NET address; nothing listens there
        let directory = HttpUserDirectory::new(&DirectorySettings {
            base_url: "http://192.0.2.1:9".to_string(),
            timeout_ms: 200,
        })
        .unwrap();

        let err = directory.fetch_user("1").await.unwrap_err();
        assert!(matches!(err, DirectoryError::Transport(_)));
    }
}
