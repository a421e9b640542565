//! services/api/src/web/auth.rs
//!
//! Credential check endpoints and the password hashing used when accounts are created.

use crate::web::{
    envelope::{ErrorEnvelope, MessageEnvelope, UserEnvelope},
    error::HttpError,
    state::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use catalog_core::ports::{PortError, PortResult};
use catalog_core::projection::UserView;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "contrasena")]
    pub password: String,
}

//=========================================================================================
// Password Hashing
//=========================================================================================

/// Hashes a plain-text password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is unreadable: {:?}", e);
            false
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Check an email and password pair
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials are valid", body = UserEnvelope),
        (status = 400, description = "Email or password missing", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload?;
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(HttpError::bad_request("Email and password are required"));
    }

    let user = state
        .users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| HttpError::unauthorized("Invalid email or password"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(HttpError::unauthorized("Invalid email or password"));
    }

    info!(user_id = %user.id, "User logged in");
    Ok(Json(UserEnvelope {
        success: true,
        data: UserView::from(user),
    }))
}

/// POST /auth/logout - Acknowledge a logout
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout acknowledged", body = MessageEnvelope)
    ),
    tag = "auth"
)]
pub async fn logout_handler() -> Json<MessageEnvelope> {
    Json(MessageEnvelope::ok("Logged out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }
}
