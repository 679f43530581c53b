// src/handlers/charges.rs

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
    models::charge::{Charge, CreateChargePayload, RefundChargePayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ChargeListQuery {
    pub enrollment_id: Uuid,
}

// POST /api/charges
#[utoipa::path(
    post,
    path = "/api/charges",
    tag = "Cobranças",
    request_body = CreateChargePayload,
    responses(
        (status = 201, description = "Cobrança criada (PENDING)", body = Charge),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Matrícula não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_charge(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let charge = app_state.charge_service.create_charge(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(charge)))
}

// GET /api/charges?enrollmentId=...
#[utoipa::path(
    get,
    path = "/api/charges",
    tag = "Cobranças",
    params(ChargeListQuery),
    responses(
        (status = 200, description = "Cobranças da matrícula", body = Vec<Charge>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_charges(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Query(query): Query<ChargeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let charges = app_state
        .charge_service
        .list_by_enrollment(user.id, query.enrollment_id)
        .await?;

    Ok((StatusCode::OK, Json(charges)))
}

// POST /api/charges/{id}/checkout: gera o link de pagamento no gateway
#[utoipa::path(
    post,
    path = "/api/charges/{id}/checkout",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Cobrança com link de pagamento", body = Charge),
        (status = 400, description = "Cobrança não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn checkout_charge(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Charge>, AppError> {
    let charge = app_state.charge_service.checkout(user.id, id).await?;
    Ok(Json(charge))
}

// POST /api/charges/{id}/mark-paid: baixa manual
#[utoipa::path(
    post,
    path = "/api/charges/{id}/mark-paid",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Cobrança paga", body = Charge),
        (status = 400, description = "Cobrança não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Charge>, AppError> {
    let charge = app_state.charge_service.mark_paid(user.id, id).await?;
    Ok(Json(charge))
}

// POST /api/charges/{id}/mark-failed: no-op fora de PENDING
#[utoipa::path(
    post,
    path = "/api/charges/{id}/mark-failed",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Cobrança cancelada (ou inalterada)", body = Charge)
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_failed(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Charge>, AppError> {
    let charge = app_state.charge_service.mark_failed(user.id, id).await?;
    Ok(Json(charge))
}

// POST /api/charges/{id}/refund
#[utoipa::path(
    post,
    path = "/api/charges/{id}/refund",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    request_body = RefundChargePayload,
    responses(
        (status = 200, description = "Reembolso aplicado", body = Charge),
        (status = 400, description = "Cobrança não reembolsável")
    ),
    security(("api_jwt" = []))
)]
pub async fn refund_charge(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RefundChargePayload>,
) -> Result<Json<Charge>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let charge = app_state.charge_service.refund(user.id, id, payload).await?;
    Ok(Json(charge))
}
