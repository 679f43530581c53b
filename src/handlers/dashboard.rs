// src/handlers/dashboard.rs

use axum::{Json, extract::State};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::dashboard::{FinancialSummary, OperationalMetrics},
};

// GET /api/dashboard/financial-summary
#[utoipa::path(
    get,
    path = "/api/dashboard/financial-summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo financeiro do prestador", body = FinancialSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn financial_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<FinancialSummary>, AppError> {
    let summary = app_state.dashboard_service.financial_summary(user.id).await?;
    Ok(Json(summary))
}

// GET /api/dashboard/operational-metrics
#[utoipa::path(
    get,
    path = "/api/dashboard/operational-metrics",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Métricas operacionais do prestador", body = OperationalMetrics)
    ),
    security(("api_jwt" = []))
)]
pub async fn operational_metrics(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<OperationalMetrics>, AppError> {
    let metrics = app_state.dashboard_service.operational_metrics(user.id).await?;
    Ok(Json(metrics))
}
