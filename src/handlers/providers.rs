// src/handlers/providers.rs

use axum::{Json, extract::State};
use std::marker::PhantomData;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::provider::{Provider, UpdateProviderPayload},
};

pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<Provider>, AppError> {
    let provider = app_state.provider_service.get_by_user(user.id).await?;
    Ok(Json(provider))
}

pub async fn update_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<UpdateProviderPayload>,
) -> Result<Json<Provider>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let provider = app_state
        .provider_service
        .update_profile(user.id, payload)
        .await?;

    Ok(Json(provider))
}
