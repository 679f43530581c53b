// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, ProviderRepository},
    models::dashboard::{FinancialSummary, OperationalMetrics},
};

#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    provider_repo: ProviderRepository,
}

impl DashboardService {
    pub fn new(dashboard_repo: DashboardRepository, provider_repo: ProviderRepository) -> Self {
        Self {
            dashboard_repo,
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

    pub async fn financial_summary(&self, user_id: Uuid) -> Result<FinancialSummary, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;
        self.dashboard_repo.financial_summary(provider_id).await
    }

    pub async fn operational_metrics(&self, user_id: Uuid) -> Result<OperationalMetrics, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;
        self.dashboard_repo.operational_metrics(provider_id).await
    }
}
