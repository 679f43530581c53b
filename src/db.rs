pub mod user_repo;
pub use user_repo::UserRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod provider_repo;
pub use provider_repo::ProviderRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod enrollment_repo;
pub use enrollment_repo::EnrollmentRepository;
pub mod charge_repo;
pub use charge_repo::ChargeRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
