// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[schema(ignore)]
    pub payment_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Projeção usada na listagem do prestador (perfil + dados básicos do usuário)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

// Cadastro de cliente feito pelo prestador (usuário + perfil, atômico)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Maria da Silva")]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@email.com")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}
