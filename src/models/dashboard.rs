// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Resumo financeiro do prestador (somas sobre as cobranças das suas matrículas)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    #[schema(example = "1200.00")]
    pub total_billed: Decimal,
    #[schema(example = "800.00")]
    pub total_received: Decimal,
    #[schema(example = "300.00")]
    pub total_pending: Decimal,
    #[schema(example = "100.00")]
    pub total_overdue: Decimal,
    #[schema(example = "0.00")]
    pub total_refunded: Decimal,
}

// Métricas operacionais do prestador
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationalMetrics {
    pub active_enrollments: i64,
    pub paused_enrollments: i64,
    pub total_clients: i64,
    // Cobranças pendentes que vencem nos próximos 7 dias
    pub upcoming_charges: i64,
}
