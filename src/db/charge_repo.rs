// src/db/charge_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::charge::{Charge, ChargeException, ChargeStatus, ExceptionAction},
};

// Partes interessadas de uma cobrança, para o fan-out de notificações
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChargeParties {
    pub provider_user_id: Uuid,
    pub client_user_id: Uuid,
}

#[derive(Clone)]
pub struct ChargeRepository {
    pool: PgPool,
}

impl ChargeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  COBRANÇAS
    // =========================================================================

    pub async fn insert_charge(
        &self,
        enrollment_id: Uuid,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<Charge, AppError> {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            INSERT INTO charges (enrollment_id, amount, due_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(enrollment_id)
            .bind(amount)
            .bind(due_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(charge)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Charge>, AppError> {
        let maybe = sqlx::query_as::<_, Charge>(
            "SELECT * FROM charges WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // Resolve a cobrança a partir do id do payment intent no gateway
    pub async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<Charge>, AppError> {
        let maybe = sqlx::query_as::<_, Charge>(
            "SELECT * FROM charges WHERE payment_gateway_id = $1",
        )
            .bind(gateway_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn list_by_enrollment(&self, enrollment_id: Uuid) -> Result<Vec<Charge>, AppError> {
        let charges = sqlx::query_as::<_, Charge>(
            "SELECT * FROM charges WHERE enrollment_id = $1 ORDER BY due_date DESC",
        )
            .bind(enrollment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(charges)
    }

    pub async fn set_gateway_info(
        &self,
        id: Uuid,
        gateway_id: &str,
        payment_link: Option<&str>,
    ) -> Result<Charge, AppError> {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET payment_gateway_id = $2, payment_link = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(gateway_id)
            .bind(payment_link)
            .fetch_one(&self.pool)
            .await?;
        Ok(charge)
    }

    pub async fn mark_paid(
        &self,
        id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<Charge, AppError> {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET status = 'PAID', paid_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(paid_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(charge)
    }

    // Cancelamento guardado no próprio UPDATE: só sai de PENDING.
    // Retorna None quando a cobrança não estava mais pendente.
    pub async fn cancel_if_pending(&self, id: Uuid) -> Result<Option<Charge>, AppError> {
        let maybe = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET status = 'CANCELED'
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn apply_refund(
        &self,
        id: Uuid,
        refunded_amount: Decimal,
        status: ChargeStatus,
    ) -> Result<Charge, AppError> {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET refunded_amount = $2, status = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(refunded_amount)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(charge)
    }

    pub async fn set_status(&self, id: Uuid, status: ChargeStatus) -> Result<Charge, AppError> {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET status = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(charge)
    }

    // Usuários do prestador e do cliente ligados à cobrança
    pub async fn find_parties(&self, charge_id: Uuid) -> Result<Option<ChargeParties>, AppError> {
        let maybe = sqlx::query_as::<_, ChargeParties>(
            r#"
            SELECT p.user_id AS provider_user_id, c.user_id AS client_user_id
            FROM charges ch
            INNER JOIN enrollments e ON e.id = ch.enrollment_id
            INNER JOIN services s ON s.id = e.service_id
            INNER JOIN providers p ON p.id = s.provider_id
            INNER JOIN clients c ON c.id = e.client_id
            WHERE ch.id = $1
            "#,
        )
            .bind(charge_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // =========================================================================
    //  EXCEÇÕES DE COBRANÇA
    // =========================================================================

    pub async fn insert_exception(
        &self,
        enrollment_id: Uuid,
        original_charge_date: NaiveDate,
        action: ExceptionAction,
        new_due_date: Option<NaiveDate>,
        new_amount: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<ChargeException, AppError> {
        let exception = sqlx::query_as::<_, ChargeException>(
            r#"
            INSERT INTO charge_exceptions (enrollment_id, original_charge_date, action, new_due_date, new_amount, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(enrollment_id)
            .bind(original_charge_date)
            .bind(action)
            .bind(new_due_date)
            .bind(new_amount)
            .bind(reason)
            .fetch_one(&self.pool)
            .await?;

        Ok(exception)
    }

    pub async fn find_exception(&self, id: Uuid) -> Result<Option<ChargeException>, AppError> {
        let maybe = sqlx::query_as::<_, ChargeException>(
            "SELECT * FROM charge_exceptions WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn list_exceptions(&self, enrollment_id: Uuid) -> Result<Vec<ChargeException>, AppError> {
        let exceptions = sqlx::query_as::<_, ChargeException>(
            "SELECT * FROM charge_exceptions WHERE enrollment_id = $1 ORDER BY original_charge_date ASC",
        )
            .bind(enrollment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(exceptions)
    }

    pub async fn delete_exception(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM charge_exceptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
