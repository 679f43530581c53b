// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{FinancialSummary, OperationalMetrics},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Financeiro do prestador
    pub async fn financial_summary(&self, provider_id: Uuid) -> Result<FinancialSummary, AppError> {
        let summary = sqlx::query_as::<_, FinancialSummary>(
            r#"
            SELECT
                COALESCE(SUM(ch.amount), 0) AS total_billed,
                COALESCE(SUM(ch.amount) FILTER (WHERE ch.status = 'PAID'), 0) AS total_received,
                COALESCE(SUM(ch.amount) FILTER (WHERE ch.status = 'PENDING'), 0) AS total_pending,
                COALESCE(SUM(ch.amount) FILTER (WHERE ch.status = 'PENDING' AND ch.due_date < CURRENT_DATE), 0) AS total_overdue,
                COALESCE(SUM(ch.refunded_amount), 0) AS total_refunded
            FROM charges ch
            INNER JOIN enrollments e ON e.id = ch.enrollment_id
            INNER JOIN services s ON s.id = e.service_id
            WHERE s.provider_id = $1
            "#,
        )
            .bind(provider_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(summary)
    }

    // 2. Métricas Operacionais do prestador
    pub async fn operational_metrics(&self, provider_id: Uuid) -> Result<OperationalMetrics, AppError> {
        let metrics = sqlx::query_as::<_, OperationalMetrics>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE e.status = 'ACTIVE') AS active_enrollments,
                COUNT(*) FILTER (WHERE e.status = 'PAUSED') AS paused_enrollments,
                COUNT(DISTINCT e.client_id) AS total_clients,
                (
                    SELECT COUNT(*)
                    FROM charges ch
                    INNER JOIN enrollments e2 ON e2.id = ch.enrollment_id
                    INNER JOIN services s2 ON s2.id = e2.service_id
                    WHERE s2.provider_id = $1
                      AND ch.status = 'PENDING'
                      AND ch.due_date BETWEEN CURRENT_DATE AND (CURRENT_DATE + INTERVAL '7 days')
                ) AS upcoming_charges
            FROM enrollments e
            INNER JOIN services s ON s.id = e.service_id
            WHERE s.provider_id = $1
            "#,
        )
            .bind(provider_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(metrics)
    }
}
