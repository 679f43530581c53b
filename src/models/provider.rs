// src/models/provider.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Status do prestador, dirigido pelos webhooks de assinatura e de conta conectada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "provider_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    Active,
    Inactive,
    PendingVerification,
    PendingPayment,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Studio Pilates Vida")]
    pub title: String,
    pub bio: Option<String>,
    pub business_phone: Option<String>,
    pub address: Option<String>,

    pub status: ProviderStatus,

    // Identificadores no gateway de pagamento
    #[schema(ignore)]
    pub payment_customer_id: Option<String>,
    #[schema(ignore)]
    pub subscription_id: Option<String>,
    // Conta conectada (Stripe Connect) que recebe o repasse
    #[schema(ignore)]
    pub provider_payment_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProviderPayload {
    #[validate(length(min = 2, message = "O título deve ter no mínimo 2 caracteres."))]
    pub title: Option<String>,
    pub bio: Option<String>,
    pub business_phone: Option<String>,
    pub address: Option<String>,
}
