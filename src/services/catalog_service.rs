// src/services/catalog_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ProviderRepository},
    models::catalog::{CreateServicePayload, Service, UpdateServicePayload},
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    provider_repo: ProviderRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, provider_repo: ProviderRepository) -> Self {
        Self {
            catalog_repo,
            provider_repo,
        }
    }

    async fn resolve_provider_id(&self, user_id: Uuid) -> Result<Uuid, AppError> {
        let provider = self
            .provider_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))?;
        Ok(provider.id)
    }

    // Resolve o serviço garantindo a posse. Serviço de outro prestador é
    // indistinguível de serviço inexistente.
    async fn resolve_owned_service(&self, user_id: Uuid, service_id: Uuid) -> Result<Service, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        let service = self
            .catalog_repo
            .find_by_id(service_id)
            .await?
            .filter(|s| s.provider_id == provider_id)
            .ok_or(AppError::NotFound("Serviço"))?;

        Ok(service)
    }

    pub async fn create_service(
        &self,
        user_id: Uuid,
        payload: CreateServicePayload,
    ) -> Result<Service, AppError> {
        if payload.default_price < Decimal::new(1, 2) {
            return Err(AppError::DomainValidation(
                "O preço padrão deve ser de no mínimo 0.01.".to_string(),
            ));
        }

        let provider_id = self.resolve_provider_id(user_id).await?;

        self.catalog_repo
            .create_service(
                provider_id,
                &payload.name,
                payload.description.as_deref(),
                payload.default_price,
                payload.is_recurrent,
                payload.address.as_deref(),
                &payload.allowed_payment_methods,
            )
            .await
    }

    pub async fn list_services(&self, user_id: Uuid) -> Result<Vec<Service>, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;
        self.catalog_repo.list_by_provider(provider_id).await
    }

    pub async fn get_service(&self, user_id: Uuid, service_id: Uuid) -> Result<Service, AppError> {
        self.resolve_owned_service(user_id, service_id).await
    }

    pub async fn update_service(
        &self,
        user_id: Uuid,
        service_id: Uuid,
        payload: UpdateServicePayload,
    ) -> Result<Service, AppError> {
        self.resolve_owned_service(user_id, service_id).await?;

        if let Some(price) = payload.default_price {
            if price < Decimal::new(1, 2) {
                return Err(AppError::DomainValidation(
                    "O preço padrão deve ser de no mínimo 0.01.".to_string(),
                ));
            }
        }

        self.catalog_repo
            .update_service(
                service_id,
                payload.name.as_deref(),
                payload.description.as_deref(),
                payload.default_price,
                payload.is_active,
                payload.is_recurrent,
                payload.address.as_deref(),
                payload.allowed_payment_methods.as_deref(),
            )
            .await
    }

    pub async fn deactivate_service(&self, user_id: Uuid, service_id: Uuid) -> Result<(), AppError> {
        self.resolve_owned_service(user_id, service_id).await?;
        self.catalog_repo.deactivate(service_id).await
    }
}
