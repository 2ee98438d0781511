use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::auth::session::{current_username, login_user, logout_user};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub username: String,
    pub email: Option<String>,
    pub created_at: Option<String>,
}

/// Session gate for the protected routes. Anything without an authenticated
/// session is turned away with a 401 before reaching a handler.
pub async fn require_session(session: Session, request: Request, next: Next) -> Response {
    match current_username(&session).await {
        Some(user) => {
            tracing::Span::current().record("user_id", &user);
            next.run(request).await
        }
        None => ApiError::Unauthorized("Not authenticated".to_string()).into_response(),
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    if !state
        .auth
        .verify_credentials(&payload.username, &payload.password)
        .await
    {
        return Err(ApiError::invalid_credentials());
    }

    login_user(&session, &payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        username: payload.username,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    logout_user(&session).await;

    Json(ApiResponse::success(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }
    if payload.username.len() < 3 {
        return Err(ApiError::validation(
            "Username must be at least 3 characters",
        ));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    if payload.password != payload.password_confirm {
        return Err(ApiError::validation("Passwords do not match"));
    }

    let email = payload.email.as_deref().filter(|e| !e.is_empty());

    let user = state
        .auth
        .create_user(&payload.username, &payload.password, email)
        .await?;

    tracing::info!("Registered new user: {}", user.username);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Registration successful! Please login.".to_string(),
    })))
}

/// GET /auth/me
///
/// The fallback admin can hold a session without a store record, so the
/// profile fields are optional.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let username = current_username(&session)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .store
        .get_active_user_by_username(&username)
        .await
        .unwrap_or_default();

    Ok(Json(ApiResponse::success(match user {
        Some(user) => MeResponse {
            username: user.username,
            email: user.email,
            created_at: Some(user.created_at),
        },
        None => MeResponse {
            username,
            email: None,
            created_at: None,
        },
    })))
}
