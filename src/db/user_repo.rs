// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1",
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
        organization_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, organization_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(organization_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })?;

        Ok(user)
    }

    // Atualiza nome e imagem do próprio perfil
    pub async fn update_profile(
        &self,
        id: Uuid,
        username: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username  = COALESCE($2, username),
                image_url = COALESCE($3, image_url)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(username)
            .bind(image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    // Promoção de papel (ex: INDIVIDUAL -> MASTER ao criar organização)
    // e vínculo com a organização, na mesma transação do chamador.
    pub async fn set_role_and_organization<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: UserRole,
        organization_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE users SET role = $2, organization_id = $3 WHERE id = $1",
        )
            .bind(user_id)
            .bind(role)
            .bind(organization_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
