//! services/api/src/web/users.rs
//!
//! Account management endpoints under `/usuarios`.

use crate::web::{
    auth::hash_password,
    envelope::{ErrorEnvelope, MessageEnvelope, UserEnvelope, UserListEnvelope},
    error::HttpError,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use catalog_core::commands;
use catalog_core::domain::{NewUser, UserPatch};
use catalog_core::projection::UserView;
use std::sync::Arc;
use tracing::info;

fn user_not_found(id: &str) -> HttpError {
    HttpError::not_found(format!("User '{}' not found", id))
}

/// GET /usuarios - List every account
#[utoipa::path(
    get,
    path = "/usuarios",
    responses(
        (status = 200, description = "All users", body = UserListEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tag = "users"
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListEnvelope>, HttpError> {
    let users = state.users.list_all().await?;
    Ok(Json(UserListEnvelope {
        success: true,
        data: users.into_iter().map(UserView::from).collect(),
    }))
}

/// GET /usuarios/{id} - Fetch one account
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserEnvelope),
        (status = 404, description = "No user with that id", body = ErrorEnvelope)
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, HttpError> {
    let user = state
        .users
        .get_by_id(&id)
        .await?
        .ok_or_else(|| user_not_found(&id))?;
    Ok(Json(UserEnvelope {
        success: true,
        data: user.into(),
    }))
}

/// POST /usuarios/guardar - Register a new account
#[utoipa::path(
    post,
    path = "/usuarios/guardar",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Missing or malformed fields", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope)
    ),
    tag = "users"
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(new_user) = payload?;
    let user = commands::create_user(state.users.as_ref(), new_user, hash_password).await?;
    info!(user_id = %user.id, role = %user.role, "User created");

    let body = UserEnvelope {
        success: true,
        data: user.into(),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// PUT /usuarios/editar/{id} - Update name, email or role
#[utoipa::path(
    put,
    path = "/usuarios/editar/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated user", body = UserEnvelope),
        (status = 400, description = "Empty or malformed update", body = ErrorEnvelope),
        (status = 404, description = "No user with that id", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope)
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserEnvelope>, HttpError> {
    let Json(patch) = payload?;
    if !commands::update_user(state.users.as_ref(), &id, patch).await? {
        return Err(user_not_found(&id));
    }
    info!(user_id = %id, "User updated");

    let user = state
        .users
        .get_by_id(&id)
        .await?
        .ok_or_else(|| user_not_found(&id))?;
    Ok(Json(UserEnvelope {
        success: true,
        data: user.into(),
    }))
}

/// DELETE /usuarios/{id} - Remove an account
#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageEnvelope),
        (status = 404, description = "No user with that id", body = ErrorEnvelope)
    ),
    tag = "users"
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, HttpError> {
    if !state.users.delete(&id).await? {
        return Err(user_not_found(&id));
    }
    info!(user_id = %id, "User deleted");
    Ok(Json(MessageEnvelope::ok("User deleted")))
}
