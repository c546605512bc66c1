//! Identity handlers for Web API.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{register, RegistrationRequest};
use crate::web::dto::{CreateUserRequest, UserResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AdminIdentity, CurrentIdentity};

/// POST /users/ - Create an identity (administrators only).
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminIdentity(admin): AdminIdentity,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let request =
        RegistrationRequest::new(req.email, req.password, req.name).with_admin(req.is_admin);
    let identity = register(state.store.as_ref(), &state.hasher, request).await?;

    tracing::info!(
        admin_id = admin.id,
        identity_id = identity.id,
        "Identity created by administrator"
    );
    Ok((StatusCode::CREATED, Json(identity.public())))
}

/// GET /users/me - The authenticated identity.
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<UserResponse> {
    Json(identity.public())
}
