// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    db::{
        CatalogRepository, ChargeRepository, ClientRepository, DashboardRepository,
        EnrollmentRepository, NotificationRepository, OrganizationRepository, ProviderRepository,
        UserRepository,
    },
    events::{DomainEvent, EventBus},
    gateway::stripe::StripeClient,
    services::{
        auth::AuthService, catalog_service::CatalogService, charge_service::ChargeService,
        client_service::ClientService, dashboard_service::DashboardService,
        enrollment_service::EnrollmentService, notification_service::NotificationService,
        organization_service::OrganizationService, payment_service::PaymentService,
        provider_service::ProviderService,
    },
};

// Configuração lida UMA vez na subida do processo. Segredo faltando
// derruba o boot, nunca falha no meio de uma requisição.
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    // Dois endpoints de webhook, dois segredos independentes
    pub stripe_webhook_secret: String,
    pub stripe_connect_webhook_secret: String,
    pub provider_plan_price_id: String,
    pub frontend_base_url: String,
    pub bind_address: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        fn required(name: &str) -> anyhow::Result<String> {
            env::var(name).map_err(|_| anyhow::anyhow!("{name} deve ser definida"))
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            stripe_connect_webhook_secret: required("STRIPE_CONNECT_WEBHOOK_SECRET")?,
            provider_plan_price_id: required("STRIPE_PROVIDER_PLAN_PRICE_ID")?,
            frontend_base_url: required("FRONTEND_BASE_URL")?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        })
    }

    pub fn checkout_success_url(&self) -> String {
        format!("{}/pagamento/sucesso", self.frontend_base_url)
    }

    pub fn checkout_cancel_url(&self) -> String {
        format!("{}/pagamento/cancelado", self.frontend_base_url)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub auth_service: AuthService,
    pub provider_service: ProviderService,
    pub client_service: ClientService,
    pub organization_service: OrganizationService,
    pub catalog_service: CatalogService,
    pub enrollment_service: EnrollmentService,
    pub charge_service: ChargeService,
    pub payment_service: PaymentService,
    pub dashboard_service: DashboardService,
    pub notification_service: NotificationService,
    pub user_repo: UserRepository,
}

impl AppState {
    // Monta o grafo de dependências inteiro num lugar só.
    // Retorna também o receptor de eventos, que vira a task de notificação.
    pub async fn new() -> anyhow::Result<(Self, UnboundedReceiver<DomainEvent>)> {
        dotenvy::dotenv().ok();

        let settings = Settings::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let organization_repo = OrganizationRepository::new(db_pool.clone());
        let provider_repo = ProviderRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let enrollment_repo = EnrollmentRepository::new(db_pool.clone());
        let charge_repo = ChargeRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        // --- Gateway e eventos ---
        let gateway: Arc<dyn crate::gateway::PaymentGateway> =
            Arc::new(StripeClient::new(settings.stripe_secret_key.clone()));
        let (events, events_rx) = EventBus::new();

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo.clone(),
            client_repo.clone(),
            provider_repo.clone(),
            gateway.clone(),
            settings.jwt_secret.clone(),
            db_pool.clone(),
        );
        let provider_service = ProviderService::new(provider_repo.clone());
        let client_service = ClientService::new(
            client_repo.clone(),
            user_repo.clone(),
            provider_repo.clone(),
            db_pool.clone(),
        );
        let organization_service = OrganizationService::new(
            organization_repo.clone(),
            user_repo.clone(),
            provider_repo.clone(),
            events.clone(),
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(catalog_repo.clone(), provider_repo.clone());
        let enrollment_service = EnrollmentService::new(
            enrollment_repo.clone(),
            catalog_repo.clone(),
            client_repo.clone(),
            provider_repo.clone(),
            db_pool.clone(),
        );
        let charge_service = ChargeService::new(
            charge_repo.clone(),
            enrollment_repo.clone(),
            provider_repo.clone(),
            gateway.clone(),
            events.clone(),
            settings.checkout_success_url(),
            settings.checkout_cancel_url(),
        );
        let payment_service = PaymentService::new(
            provider_repo.clone(),
            user_repo.clone(),
            charge_service.clone(),
            gateway.clone(),
            settings.provider_plan_price_id.clone(),
            settings.checkout_success_url(),
            settings.checkout_cancel_url(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, provider_repo);
        let notification_service = NotificationService::new(notification_repo);

        let state = Self {
            db_pool,
            settings,
            auth_service,
            provider_service,
            client_service,
            organization_service,
            catalog_service,
            enrollment_service,
            charge_service,
            payment_service,
            dashboard_service,
            notification_service,
            user_repo,
        };

        Ok((state, events_rx))
    }
}
