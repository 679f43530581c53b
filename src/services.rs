pub mod auth;
pub mod catalog_service;
pub mod charge_service;
pub mod client_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod notification_service;
pub mod organization_service;
pub mod payment_service;
pub mod provider_service;
