// src/services/provider_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProviderRepository,
    models::provider::{Provider, UpdateProviderPayload},
};

#[derive(Clone)]
pub struct ProviderService {
    repo: ProviderRepository,
}

impl ProviderService {
    pub fn new(repo: ProviderRepository) -> Self {
        Self { repo }
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Provider, AppError> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UpdateProviderPayload,
    ) -> Result<Provider, AppError> {
        // Garante que o perfil existe antes de atualizar
        self.get_by_user(user_id).await?;

        self.repo
            .update_profile(
                user_id,
                payload.title.as_deref(),
                payload.bio.as_deref(),
                payload.business_phone.as_deref(),
                payload.address.as_deref(),
            )
            .await
    }
}
