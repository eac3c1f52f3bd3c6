use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use usher_core::Signup;

// -------------------------
// Client-Visible Message Catalog
// -------------------------

/// The fixed catalog of client-visible messages.
///
/// Every message a handler can put on the wire lives here, keyed by
/// error kind, so the mapping is immutable and reviewable in one place.
pub mod messages {
    pub const USER_CREATE_FAILED: &str = "Failed to create user.";
    pub const WELCOME_MAIL_FAILED: &str = "Failed to send welcome email.";
    pub const EVENT_PUBLISH_FAILED: &str = "Failed to publish user creation event.";

    pub const USER_NOT_FOUND: &str = "User not found";
    pub const AVATAR_NOT_FOUND: &str = "Avatar image not found";
    pub const AVATAR_FETCH_FAILED: &str = "Failed to fetch avatar image";
    pub const AVATAR_UNEXPECTED: &str = "Unexpected error while fetching avatar";
    pub const AVATAR_DELETE_FAILED: &str = "Failed to delete avatar";
    pub const AVATAR_DELETED: &str = "Avatar deleted successful!";

    pub const NAME_EMPTY: &str = "Name should not be empty";
    pub const JOB_EMPTY: &str = "Job should not be empty";
    pub const EMAIL_INVALID: &str = "Invalid email format";

    pub fn user_not_found_with_id(user_id: &str) -> String {
        format!("User with ID {user_id} not found.")
    }

    pub fn user_fetch_failed(user_id: &str, detail: &str) -> String {
        format!("Failed to fetch user with ID {user_id}: {detail}")
    }
}

// -------------------------
// API Error Type
// -------------------------

/// JSON body for error responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

/// High-level API errors mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-visible message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status_code().as_u16(),
            message: self.message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self.to_error_body()) {
            Ok(b) => b,
            Err(_) => {
                let fallback = ErrorBody {
                    status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    message: "Serialization failure".to_string(),
                };
                serde_json::to_vec(&fallback).unwrap_or_else(|_| b"{}".to_vec())
            }
        };

        axum::http::Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}


// -------------------------
// Request DTOs & Validation
// -------------------------

/// Body of `POST /users`.
///
/// Fields default to empty strings so a missing field fails validation
/// with its catalog message instead of a deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub email: String,
}

impl CreateUserRequest {
    /// Validates the request and converts it into a `Signup`.
    ///
    /// Checks run in field order and the first failure wins, each with
    /// its distinct catalog message.
    pub fn validate(&self) -> Result<Signup, ApiError> {
        if self.name.is_empty() {
            return Err(ApiError::bad_request(messages::NAME_EMPTY));
        }
        if self.job.is_empty() {
            return Err(ApiError::bad_request(messages::JOB_EMPTY));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request(messages::EMAIL_INVALID));
        }
        Ok(Signup::new(
            self.name.clone(),
            self.job.clone(),
            self.email.clone(),
        ))
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
