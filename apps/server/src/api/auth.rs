use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use papertrade_core::constants::MIN_PASSWORD_LEN;
use papertrade_core::users::{NewUser, User};

use crate::auth::{hash_password, verify_password, AuthError, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

/// Create a user account. The plaintext password never reaches the core
/// layer; it is hashed here and stored as a PHC string.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let password_hash = hash_password(&payload.password)?;
    let user = state
        .user_service
        .register(NewUser {
            username: payload.username,
            password_hash,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a bearer token.
///
/// An unknown username answers exactly like a wrong password.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let user = state
        .user_service
        .get_by_username(payload.username.trim())
        .map_err(|e| {
            if e.is_not_found() {
                AuthError::InvalidCredentials
            } else {
                AuthError::Internal(e.to_string())
            }
        })?;

    verify_password(&payload.password, &user.password_hash)?;
    let token = state.auth.issue_token(&user.id)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.expires_in().as_secs(),
    }))
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.get_user(&current.id)?;
    Ok(Json(user))
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}
