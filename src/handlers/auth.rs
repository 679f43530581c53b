// src/handlers/auth.rs

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthResponse, LoginUserPayload, RegisterProviderPayload, RegisterUserPayload},
};

// Handler de registro de cliente
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state.auth_service.register_client(payload).await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de registro de prestador
pub async fn register_provider(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterProviderPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state.auth_service.register_provider(payload).await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}
