// src/handlers/services.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::marker::PhantomData;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::catalog::{CreateServicePayload, Service, UpdateServicePayload},
};

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Catálogo",
    request_body = CreateServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = app_state.catalog_service.create_service(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Catálogo do prestador", body = Vec<Service>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<impl IntoResponse, AppError> {
    let services = app_state.catalog_service.list_services(user.id).await?;
    Ok((StatusCode::OK, Json(services)))
}

// GET /api/services/{id}
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Catálogo",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let service = app_state.catalog_service.get_service(user.id, id).await?;
    Ok(Json(service))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Catálogo",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = UpdateServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServicePayload>,
) -> Result<Json<Service>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = app_state
        .catalog_service
        .update_service(user.id, id, payload)
        .await?;

    Ok(Json(service))
}

// DELETE /api/services/{id}: exclusão lógica
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Catálogo",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 204, description = "Serviço desativado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.deactivate_service(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
