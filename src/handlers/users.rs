// src/handlers/users.rs

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{UpdateUserPayload, User},
};

// Handler da rota protegida /me
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .user_repo
        .update_profile(user.id, payload.username.as_deref(), payload.image_url.as_deref())
        .await?;

    Ok(Json(updated))
}
