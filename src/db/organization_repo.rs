// src/db/organization_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::organization::{Organization, OrganizationMember},
};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_organization<'e, E>(
        &self,
        executor: E,
        name: &str,
        owner_id: Uuid,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, owner_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(owner_id)
            .fetch_one(executor)
            .await?;

        Ok(organization)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let maybe_org = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_org)
    }

    // Um usuário pode ser dono de no máximo uma organização (regra de serviço)
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Organization>, AppError> {
        let maybe_org = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE owner_id = $1",
        )
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_org)
    }

    // Todos os usuários vinculados à organização (dono incluído)
    pub async fn list_members(&self, organization_id: Uuid) -> Result<Vec<OrganizationMember>, AppError> {
        let members = sqlx::query_as::<_, OrganizationMember>(
            r#"
            SELECT id, username, email, role
            FROM users
            WHERE organization_id = $1
            ORDER BY username ASC
            "#,
        )
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(members)
    }
}
