pub mod auth;
pub mod catalog;
pub mod charge;
pub mod client;
pub mod dashboard;
pub mod enrollment;
pub mod notification;
pub mod organization;
pub mod provider;
