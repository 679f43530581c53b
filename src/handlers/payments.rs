// src/handlers/payments.rs

use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
};

// POST /api/payments/subscription/provider: checkout da assinatura da plataforma
pub async fn provider_subscription_checkout(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<Value>, AppError> {
    let url = app_state.payment_service.subscription_checkout(user.id).await?;
    Ok(Json(json!({ "checkoutUrl": url })))
}

// GET /api/payments/balance: saldo da conta conectada do prestador
pub async fn get_balance(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<Value>, AppError> {
    let balance = app_state.payment_service.balance(user.id).await?;
    Ok(Json(json!(balance)))
}

// GET /api/payments/payouts: repasses recentes da conta conectada
pub async fn list_payouts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<Value>, AppError> {
    let payouts = app_state.payment_service.payouts(user.id).await?;
    Ok(Json(json!(payouts)))
}
