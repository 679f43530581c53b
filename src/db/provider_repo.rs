// src/db/provider_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::provider::{Provider, ProviderStatus},
};

#[derive(Clone)]
pub struct ProviderRepository {
    pool: PgPool,
}

impl ProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_provider<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        title: &str,
        bio: Option<&str>,
        business_phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Provider, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            INSERT INTO providers (user_id, title, bio, business_phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(title)
            .bind(bio)
            .bind(business_phone)
            .bind(address)
            .fetch_one(executor)
            .await?;

        Ok(provider)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Provider>, AppError> {
        let maybe = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE user_id = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, AppError> {
        let maybe = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        title: Option<&str>,
        bio: Option<&str>,
        business_phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Provider, AppError> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            UPDATE providers
            SET title          = COALESCE($2, title),
                bio            = COALESCE($3, bio),
                business_phone = COALESCE($4, business_phone),
                address        = COALESCE($5, address)
            WHERE user_id = $1
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(title)
            .bind(bio)
            .bind(business_phone)
            .bind(address)
            .fetch_one(&self.pool)
            .await?;

        Ok(provider)
    }

    // --- Vínculos com o gateway de pagamento ---

    pub async fn set_payment_customer(&self, id: Uuid, customer_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE providers SET payment_customer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_subscription(&self, id: Uuid, subscription_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE providers SET subscription_id = $2 WHERE id = $1")
            .bind(id)
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: ProviderStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE providers SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Resolução reversa a partir dos identificadores do gateway ---

    pub async fn find_by_payment_customer(&self, customer_id: &str) -> Result<Option<Provider>, AppError> {
        let maybe = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE payment_customer_id = $1",
        )
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_by_subscription(&self, subscription_id: &str) -> Result<Option<Provider>, AppError> {
        let maybe = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE subscription_id = $1",
        )
            .bind(subscription_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_by_connected_account(&self, account_id: &str) -> Result<Option<Provider>, AppError> {
        let maybe = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE provider_payment_id = $1",
        )
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }
}
