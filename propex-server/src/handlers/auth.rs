use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use propex_core::auth::{password, token};

use crate::api::ApiResponse;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: String,
    pub roles: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<JwtResponse>>> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !password::verify_password(&user.password_hash, &request.password) {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let access_token = token::issue_token(
        &state.auth.jwt_secret,
        user.id.to_uuid(),
        &user.roles,
        state.auth.token_ttl_secs,
    )?;

    info!(user = %user.id, "login succeeded");
    Ok(Json(ApiResponse::success(JwtResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.token_ttl_secs,
        user_id: user.id.to_string(),
        roles: user.roles,
    })))
}

/// Issues a reset token into the shared TTL store. Delivery to the user's
/// mailbox is handled elsewhere; here the token is only logged.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("User not found with email: {}", request.email))
        })?;

    let reset_token = state.reset_tokens.issue(user.id).await?;
    info!(user = %user.id, token = %reset_token, "password reset requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(()).with_message("Password reset requested".to_string())),
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if request.new_password != request.confirm_password {
        return Err(AppError::bad_request("Passwords do not match"));
    }

    let user_id = state
        .reset_tokens
        .consume(&request.token)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid or expired token"))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let new_hash = password::hash_password(&request.new_password)?;
    state.users.update_password(user.id, &new_hash).await?;

    info!(user = %user.id, "password has been reset");
    Ok(Json(
        ApiResponse::success(()).with_message("Password updated".to_string()),
    ))
}
