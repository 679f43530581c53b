// src/services/client_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, ProviderRepository, UserRepository},
    models::client::{Client, ClientSummary, CreateClientPayload},
    models::auth::UserRole,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    user_repo: UserRepository,
    provider_repo: ProviderRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(
        client_repo: ClientRepository,
        user_repo: UserRepository,
        provider_repo: ProviderRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            client_repo,
            user_repo,
            provider_repo,
            pool,
        }
    }

    // Cadastro de cliente feito pelo prestador: usuário + perfil na mesma
    // transação. A senha inicial é aleatória; o cliente redefine depois.
    pub async fn create_for_provider(
        &self,
        provider_user_id: Uuid,
        payload: CreateClientPayload,
    ) -> Result<Client, AppError> {
        self.provider_repo
            .find_by_user(provider_user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))?;

        let initial_password = Uuid::new_v4().simple().to_string();
        let hashed_password = hash_password(&initial_password).await?;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                UserRole::Client,
                None,
            )
            .await?;

        let client = self
            .client_repo
            .create_client(
                &mut *tx,
                new_user.id,
                payload.phone.as_deref(),
                payload.address.as_deref(),
            )
            .await?;

        tx.commit().await?;

        Ok(client)
    }

    pub async fn list_for_provider(&self, provider_user_id: Uuid) -> Result<Vec<ClientSummary>, AppError> {
        let provider = self
            .provider_repo
            .find_by_user(provider_user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))?;

        self.client_repo.list_by_provider(provider.id).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Client, AppError> {
        self.client_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }
}
