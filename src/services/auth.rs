// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, ProviderRepository, UserRepository},
    gateway::PaymentGateway,
    models::auth::{Claims, RegisterProviderPayload, RegisterUserPayload, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    client_repo: ClientRepository,
    provider_repo: ProviderRepository,
    gateway: Arc<dyn PaymentGateway>,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        client_repo: ClientRepository,
        provider_repo: ProviderRepository,
        gateway: Arc<dyn PaymentGateway>,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            client_repo,
            provider_repo,
            gateway,
            jwt_secret,
            pool,
        }
    }

    // Cadastro de cliente: usuário + perfil, atomicamente
    pub async fn register_client(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        let hashed_password = hash_password(&payload.password).await?;

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

        self.client_repo
            .create_client(
                &mut *tx,
                new_user.id,
                payload.phone.as_deref(),
                payload.address.as_deref(),
            )
            .await?;

        tx.commit().await?;

        self.create_token(new_user.id)
    }

    // Cadastro de prestador: usuário (INDIVIDUAL) + perfil de prestador.
    // O customer no gateway é criado fora da transação: se falhar, o cadastro
    // continua valendo e o vínculo é refeito depois.
    pub async fn register_provider(&self, payload: RegisterProviderPayload) -> Result<String, AppError> {
        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                UserRole::Individual,
                None,
            )
            .await?;

        let provider = self
            .provider_repo
            .create_provider(
                &mut *tx,
                new_user.id,
                &payload.title,
                payload.bio.as_deref(),
                payload.business_phone.as_deref(),
                payload.address.as_deref(),
            )
            .await?;

        tx.commit().await?;

        match self
            .gateway
            .create_customer(&payload.username, &payload.email)
            .await
        {
            Ok(customer_id) => {
                self.provider_repo
                    .set_payment_customer(provider.id, &customer_id)
                    .await?;
            }
            Err(e) => {
                tracing::error!("Falha ao criar customer no gateway para {}: {}", provider.id, e);
            }
        }

        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// Hashing fora do executor async (bcrypt é CPU-bound)
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}
