// src/models/charge.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Máquina de estados da cobrança:
// PENDING -> PAID | CANCELED
// PAID    -> REFUNDED | PARTIALLY_REFUNDED | IN_DISPUTE
// IN_DISPUTE pode ser atingido de qualquer estado (webhook de disputa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "charge_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Canceled,
    Refunded,
    PartiallyRefunded,
    InDispute,
}

impl ChargeStatus {
    // CANCELED só é atingível a partir de PENDING; uma cobrança paga
    // jamais pode ser cancelada por "marcar como falha".
    pub fn can_cancel(&self) -> bool {
        matches!(self, ChargeStatus::Pending)
    }

    pub fn can_refund(&self) -> bool {
        matches!(self, ChargeStatus::Paid | ChargeStatus::PartiallyRefunded)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: Uuid,
    pub enrollment_id: Uuid,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub due_date: NaiveDate,

    pub status: ChargeStatus,
    pub paid_at: Option<DateTime<Utc>>,

    #[schema(example = "0.00")]
    pub refunded_amount: Decimal,

    // Id do payment intent no gateway e link de pagamento do checkout
    pub payment_gateway_id: Option<String>,
    pub payment_link: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargePayload {
    pub enrollment_id: Uuid,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundChargePayload {
    // Quando ausente, reembolsa o restante da cobrança
    #[schema(example = "40.00")]
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

// --- Exceções de cobrança (sobrescrita pontual de uma ocorrência) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "exception_action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionAction {
    Skip,
    Postpone,
    ModifyAmount,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeException {
    pub id: Uuid,
    pub enrollment_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-06-05")]
    pub original_charge_date: NaiveDate,

    pub action: ExceptionAction,

    #[schema(value_type = Option<String>, format = Date)]
    pub new_due_date: Option<NaiveDate>,
    pub new_amount: Option<Decimal>,
    pub reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeExceptionPayload {
    pub enrollment_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-06-05")]
    pub original_charge_date: NaiveDate,

    pub action: ExceptionAction,

    #[schema(value_type = Option<String>, format = Date)]
    pub new_due_date: Option<NaiveDate>,
    pub new_amount: Option<Decimal>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelamento_so_a_partir_de_pending() {
        assert!(ChargeStatus::Pending.can_cancel());

        // Uma cobrança PAGA nunca vira CANCELED
        assert!(!ChargeStatus::Paid.can_cancel());
        assert!(!ChargeStatus::Refunded.can_cancel());
        assert!(!ChargeStatus::PartiallyRefunded.can_cancel());
        assert!(!ChargeStatus::InDispute.can_cancel());
        assert!(!ChargeStatus::Canceled.can_cancel());
    }

    #[test]
    fn reembolso_so_sobre_cobranca_paga() {
        assert!(ChargeStatus::Paid.can_refund());
        assert!(ChargeStatus::PartiallyRefunded.can_refund());

        assert!(!ChargeStatus::Pending.can_refund());
        assert!(!ChargeStatus::Canceled.can_refund());
        assert!(!ChargeStatus::Refunded.can_refund());
    }
}
