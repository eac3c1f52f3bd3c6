use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use usher_api::{ApiError, CreateUserRequest, messages};
use usher_service::{AvatarError, ProvisionError};

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Usher Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// ---- Users ----

/// POST /users: provision a user, then send the welcome mail and publish
/// the signup event. A follow-up failure fails the whole request; the
/// record created before the failure is kept.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signup = payload.validate()?;
    let user = state.provisioning.create(signup).await.map_err(|err| {
        tracing::error!(error = %err, "user provisioning failed");
        match err {
            ProvisionError::UserCreation(_) => ApiError::internal(messages::USER_CREATE_FAILED),
            ProvisionError::Notification(_) => ApiError::internal(messages::WELCOME_MAIL_FAILED),
            ProvisionError::EventPublish(_) => ApiError::internal(messages::EVENT_PUBLISH_FAILED),
        }
    })?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}: look the user up in the remote directory and return
/// its document unchanged.
pub async fn fetch_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.directory.fetch_user(&user_id).await {
        Ok(doc) => Ok((StatusCode::OK, Json(doc))),
        Err(err) if err.is_not_found() => Err(ApiError::not_found(
            messages::user_not_found_with_id(&user_id),
        )),
        Err(err) => {
            tracing::error!(user_id = %user_id, error = %err, "directory lookup failed");
            Err(ApiError::internal(messages::user_fetch_failed(
                &user_id,
                &err.to_string(),
            )))
        }
    }
}

// ---- Avatars ----

/// GET /users/{id}/avatar: the resolved base64 payload as the body.
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<String, ApiError> {
    state.avatars.resolve(&user_id).await.map_err(|err| match &err {
        AvatarError::NotFound => ApiError::not_found(messages::AVATAR_NOT_FOUND),
        AvatarError::FetchFailed(_) => {
            tracing::error!(user_id = %user_id, error = %err, "avatar fetch failed");
            ApiError::internal(messages::AVATAR_FETCH_FAILED)
        }
        AvatarError::Unexpected(_) => {
            tracing::error!(user_id = %user_id, error = %err, "avatar resolution failed");
            ApiError::internal(messages::AVATAR_UNEXPECTED)
        }
    })
}

/// DELETE /users/{id}/avatar: drop both cache tiers for the user.
pub async fn delete_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<String, ApiError> {
    match state.avatars.delete(&user_id).await {
        Ok(()) => Ok(messages::AVATAR_DELETED.to_string()),
        Err(err) if err.is_not_found() => Err(ApiError::not_found(messages::USER_NOT_FOUND)),
        Err(err) => {
            tracing::error!(user_id = %user_id, error = %err, "avatar delete failed");
            Err(ApiError::internal(messages::AVATAR_DELETE_FAILED))
        }
    }
}
