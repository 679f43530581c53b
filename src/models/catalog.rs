// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    Pix,
    Boleto,
    Cash,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,

    #[schema(ignore)]
    pub provider_id: Uuid,

    #[schema(example = "Aula de Pilates")]
    pub name: String,
    pub description: Option<String>,

    #[schema(example = "200.00")]
    pub default_price: Decimal,

    pub is_active: bool,
    pub is_recurrent: bool,
    pub address: Option<String>,
    pub allowed_payment_methods: Vec<PaymentMethod>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Aula de Pilates")]
    pub name: String,
    pub description: Option<String>,

    #[schema(example = "200.00")]
    pub default_price: Decimal,

    #[serde(default)]
    pub is_recurrent: bool,
    pub address: Option<String>,

    #[serde(default)]
    #[schema(example = json!(["PIX", "CREDIT_CARD"]))]
    pub allowed_payment_methods: Vec<PaymentMethod>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub is_recurrent: Option<bool>,
    pub address: Option<String>,
    pub allowed_payment_methods: Option<Vec<PaymentMethod>>,
}
