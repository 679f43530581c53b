// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Client, ClientSummary},
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (user_id, phone, address)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(phone)
            .bind(address)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let maybe = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Client>, AppError> {
        let maybe = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE user_id = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // Clientes com matrícula em algum serviço do prestador
    pub async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<ClientSummary>, AppError> {
        let clients = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT DISTINCT c.id, c.user_id, u.username, u.email, c.phone
            FROM clients c
            INNER JOIN users u ON u.id = c.user_id
            INNER JOIN enrollments e ON e.client_id = c.id
            INNER JOIN services s ON s.id = e.service_id
            WHERE s.provider_id = $1
            ORDER BY u.username ASC
            "#,
        )
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    pub async fn set_payment_customer(&self, id: Uuid, customer_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE clients SET payment_customer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
