// src/db/enrollment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::enrollment::{
        BillingModel, BillingType, ChargeSchedule, Enrollment, EnrollmentStatus,
        NewServiceSchedule, RecurrenceInterval, ServiceSchedule,
    },
};

#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MATRÍCULAS
    // =========================================================================

    pub async fn insert_enrollment<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
        client_id: Uuid,
        price: Decimal,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        billing_type: Option<BillingType>,
    ) -> Result<Enrollment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (service_id, client_id, price, start_date, end_date, billing_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(service_id)
            .bind(client_id)
            .bind(price)
            .bind(start_date)
            .bind(end_date)
            .bind(billing_type)
            .fetch_one(executor)
            .await?;

        Ok(enrollment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, AppError> {
        let maybe = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // Resolve a matrícula garantindo que o serviço pertence ao prestador.
    // Quem não é dono recebe o mesmo NotFound de quem busca um id inexistente.
    pub async fn find_for_provider(
        &self,
        id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError> {
        let maybe = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT e.*
            FROM enrollments e
            INNER JOIN services s ON s.id = e.service_id
            WHERE e.id = $1 AND s.provider_id = $2
            "#,
        )
            .bind(id)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT e.*
            FROM enrollments e
            INNER JOIN services s ON s.id = e.service_id
            WHERE s.provider_id = $1
            ORDER BY e.created_at DESC
            "#,
        )
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(enrollments)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE client_id = $1 ORDER BY created_at DESC",
        )
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(enrollments)
    }

    pub async fn update_enrollment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        price: Option<Decimal>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        status: Option<EnrollmentStatus>,
        billing_type: Option<BillingType>,
    ) -> Result<Enrollment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET price        = COALESCE($2, price),
                start_date   = COALESCE($3, start_date),
                end_date     = COALESCE($4, end_date),
                status       = COALESCE($5, status),
                billing_type = COALESCE($6, billing_type)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(price)
            .bind(start_date)
            .bind(end_date)
            .bind(status)
            .bind(billing_type)
            .fetch_one(executor)
            .await?;

        Ok(enrollment)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: EnrollmentStatus,
        end_date: Option<NaiveDate>,
    ) -> Result<Enrollment, AppError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET status = $2, end_date = COALESCE($3, end_date)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(end_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(enrollment)
    }

    pub async fn set_pause_window(
        &self,
        id: Uuid,
        pause_start: NaiveDate,
        pause_end: NaiveDate,
    ) -> Result<Enrollment, AppError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET status = 'PAUSED', pause_start_date = $2, pause_end_date = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(pause_start)
            .bind(pause_end)
            .fetch_one(&self.pool)
            .await?;
        Ok(enrollment)
    }

    // =========================================================================
    //  AGENDA DE COBRANÇA (1:1)
    // =========================================================================

    pub async fn insert_charge_schedule<'e, E>(
        &self,
        executor: E,
        enrollment_id: Uuid,
        billing_model: BillingModel,
        recurrence_interval: Option<RecurrenceInterval>,
        charge_day: i16,
        due_date: Option<NaiveDate>,
    ) -> Result<ChargeSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, ChargeSchedule>(
            r#"
            INSERT INTO charge_schedules (enrollment_id, billing_model, recurrence_interval, charge_day, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(enrollment_id)
            .bind(billing_model)
            .bind(recurrence_interval)
            .bind(charge_day)
            .bind(due_date)
            .fetch_one(executor)
            .await?;

        Ok(schedule)
    }

    pub async fn update_charge_schedule<'e, E>(
        &self,
        executor: E,
        enrollment_id: Uuid,
        billing_model: BillingModel,
        recurrence_interval: Option<RecurrenceInterval>,
        charge_day: i16,
        due_date: Option<NaiveDate>,
    ) -> Result<ChargeSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, ChargeSchedule>(
            r#"
            UPDATE charge_schedules
            SET billing_model = $2, recurrence_interval = $3, charge_day = $4, due_date = $5
            WHERE enrollment_id = $1
            RETURNING *
            "#,
        )
            .bind(enrollment_id)
            .bind(billing_model)
            .bind(recurrence_interval)
            .bind(charge_day)
            .bind(due_date)
            .fetch_one(executor)
            .await?;

        Ok(schedule)
    }

    pub async fn find_charge_schedule(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<ChargeSchedule>, AppError> {
        let maybe = sqlx::query_as::<_, ChargeSchedule>(
            "SELECT * FROM charge_schedules WHERE enrollment_id = $1",
        )
            .bind(enrollment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // =========================================================================
    //  AGENDA DO SERVIÇO (N:1)
    // =========================================================================

    pub async fn insert_service_schedule<'e, E>(
        &self,
        executor: E,
        enrollment_id: Uuid,
        row: &NewServiceSchedule,
    ) -> Result<ServiceSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, ServiceSchedule>(
            r#"
            INSERT INTO service_schedules (enrollment_id, frequency, day_of_week, day_of_month, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(enrollment_id)
            .bind(row.frequency)
            .bind(row.day_of_week)
            .bind(row.day_of_month)
            .bind(&row.start_time)
            .bind(&row.end_time)
            .fetch_one(executor)
            .await?;

        Ok(schedule)
    }

    pub async fn delete_service_schedules<'e, E>(
        &self,
        executor: E,
        enrollment_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM service_schedules WHERE enrollment_id = $1")
            .bind(enrollment_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_service_schedules(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<ServiceSchedule>, AppError> {
        let schedules = sqlx::query_as::<_, ServiceSchedule>(
            "SELECT * FROM service_schedules WHERE enrollment_id = $1 ORDER BY created_at ASC",
        )
            .bind(enrollment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(schedules)
    }
}
