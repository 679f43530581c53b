// src/handlers/clients.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::marker::PhantomData;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ClientAccess, ProviderAccess, RequireRole},
    },
    models::client::{Client, CreateClientPayload},
};

// POST /api/clients: prestador cadastra um cliente em seu nome
pub async fn create_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let client = app_state
        .client_service
        .create_for_provider(user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients: clientes matriculados nos serviços do prestador
pub async fn list_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.client_service.list_for_provider(user.id).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/me: o próprio perfil de cliente
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ClientAccess>,
) -> Result<Json<Client>, AppError> {
    let client = app_state.client_service.get_by_user(user.id).await?;
    Ok(Json(client))
}
