// src/handlers/webhooks.rs
//
// Os dois endpoints de webhook do Stripe. O corpo chega CRU (Bytes):
// a assinatura é verificada sobre os bytes exatos antes de qualquer parse.
// Assinatura inválida = 401, e nada é processado.

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    gateway::stripe::{StripeEvent, verify_signature},
};

const SIGNATURE_HEADER: &str = "Stripe-Signature";

fn extract_signature(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::WebhookSignatureInvalid)
}

fn parse_event(body: &[u8]) -> Result<StripeEvent, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        AppError::GatewayError(anyhow::anyhow!("payload de webhook inválido: {e}"))
    })
}

// POST /api/webhooks/stripe: eventos de plataforma
pub async fn stripe_platform(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = extract_signature(&headers)?;
    verify_signature(
        &body,
        signature,
        &app_state.settings.stripe_webhook_secret,
        Utc::now().timestamp(),
    )?;

    let event = parse_event(&body)?;
    app_state.payment_service.handle_platform_event(event).await?;

    Ok(StatusCode::OK)
}

// POST /api/webhooks/stripe/connect: eventos de conta conectada
pub async fn stripe_connect(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = extract_signature(&headers)?;
    verify_signature(
        &body,
        signature,
        &app_state.settings.stripe_connect_webhook_secret,
        Utc::now().timestamp(),
    )?;

    let event = parse_event(&body)?;
    app_state.payment_service.handle_connect_event(event).await?;

    Ok(StatusCode::OK)
}
