pub mod auth;
pub mod charge_exceptions;
pub mod charges;
pub mod clients;
pub mod dashboard;
pub mod enrollments;
pub mod organizations;
pub mod payments;
pub mod providers;
pub mod schedules;
pub mod services;
pub mod users;
pub mod webhooks;
