// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{PaymentMethod, Service},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_service(
        &self,
        provider_id: Uuid,
        name: &str,
        description: Option<&str>,
        default_price: Decimal,
        is_recurrent: bool,
        address: Option<&str>,
        allowed_payment_methods: &[PaymentMethod],
    ) -> Result<Service, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (
                provider_id, name, description, default_price,
                is_recurrent, address, allowed_payment_methods
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(provider_id)
            .bind(name)
            .bind(description)
            .bind(default_price)
            .bind(is_recurrent)
            .bind(address)
            .bind(allowed_payment_methods)
            .fetch_one(&self.pool)
            .await?;

        Ok(service)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let maybe = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE provider_id = $1 ORDER BY name ASC",
        )
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    pub async fn update_service(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        default_price: Option<Decimal>,
        is_active: Option<bool>,
        is_recurrent: Option<bool>,
        address: Option<&str>,
        allowed_payment_methods: Option<&[PaymentMethod]>,
    ) -> Result<Service, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name                    = COALESCE($2, name),
                description             = COALESCE($3, description),
                default_price           = COALESCE($4, default_price),
                is_active               = COALESCE($5, is_active),
                is_recurrent            = COALESCE($6, is_recurrent),
                address                 = COALESCE($7, address),
                allowed_payment_methods = COALESCE($8, allowed_payment_methods)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(default_price)
            .bind(is_active)
            .bind(is_recurrent)
            .bind(address)
            .bind(allowed_payment_methods)
            .fetch_one(&self.pool)
            .await?;

        Ok(service)
    }

    // Exclusão lógica: o serviço sai do catálogo mas as matrículas históricas ficam
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE services SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
