// src/handlers/charge_exceptions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::marker::PhantomData;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::charge::{ChargeException, CreateChargeExceptionPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExceptionListQuery {
    pub enrollment_id: Uuid,
}

// POST /api/charge-exceptions
#[utoipa::path(
    post,
    path = "/api/charge-exceptions",
    tag = "Exceções de Cobrança",
    request_body = CreateChargeExceptionPayload,
    responses(
        (status = 201, description = "Exceção registrada", body = ChargeException),
        (status = 400, description = "Campos obrigatórios da ação ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_exception(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateChargeExceptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let exception = app_state
        .charge_service
        .create_exception(user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(exception)))
}

// GET /api/charge-exceptions?enrollmentId=...
#[utoipa::path(
    get,
    path = "/api/charge-exceptions",
    tag = "Exceções de Cobrança",
    params(ExceptionListQuery),
    responses(
        (status = 200, description = "Exceções da matrícula", body = Vec<ChargeException>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_exceptions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Query(query): Query<ExceptionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let exceptions = app_state
        .charge_service
        .list_exceptions(user.id, query.enrollment_id)
        .await?;

    Ok((StatusCode::OK, Json(exceptions)))
}

// DELETE /api/charge-exceptions/{id}
#[utoipa::path(
    delete,
    path = "/api/charge-exceptions/{id}",
    tag = "Exceções de Cobrança",
    params(("id" = Uuid, Path, description = "ID da exceção")),
    responses(
        (status = 204, description = "Exceção removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_exception(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.charge_service.delete_exception(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
