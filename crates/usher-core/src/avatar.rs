use serde::{Deserialize, Serialize};

/// Cached avatar payload for a single user, keyed by the user id.
///
/// A record whose payload is absent or empty is an unresolved
/// placeholder; resolution treats it as a cache miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "imageBase64", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl AvatarRecord {
    pub fn placeholder(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            image_base64: None,
        }
    }

    pub fn resolved(user_id: impl Into<String>, image_base64: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            image_base64: Some(image_base64.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.payload().is_some()
    }

    /// The stored payload, or `None` for a placeholder or empty payload.
    pub fn payload(&self) -> Option<&str> {
        self.image_base64.as_deref().filter(|p| !p.is_empty())
    }
}
