// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catálogo ---
        handlers::services::create_service,
        handlers::services::list_services,
        handlers::services::get_service,
        handlers::services::update_service,
        handlers::services::delete_service,

        // --- Organizações ---
        handlers::organizations::create_organization,
        handlers::organizations::get_my_organization,
        handlers::organizations::invite_sub_provider,

        // --- Matrículas ---
        handlers::enrollments::create_enrollment,
        handlers::enrollments::list_enrollments,
        handlers::enrollments::get_enrollment,
        handlers::enrollments::update_enrollment,
        handlers::enrollments::cancel_enrollment,
        handlers::enrollments::pause_enrollment,

        // --- Cobranças ---
        handlers::charges::create_charge,
        handlers::charges::list_charges,
        handlers::charges::checkout_charge,
        handlers::charges::mark_paid,
        handlers::charges::mark_failed,
        handlers::charges::refund_charge,

        // --- Exceções de Cobrança ---
        handlers::charge_exceptions::create_exception,
        handlers::charge_exceptions::list_exceptions,
        handlers::charge_exceptions::delete_exception,

        // --- Dashboard ---
        handlers::dashboard::financial_summary,
        handlers::dashboard::operational_metrics,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,

            // --- Organizações ---
            models::organization::Organization,
            models::organization::OrganizationMember,
            models::organization::OrganizationDetail,
            models::organization::CreateOrganizationPayload,
            models::organization::InviteSubProviderPayload,

            // --- Catálogo ---
            models::catalog::PaymentMethod,
            models::catalog::Service,
            models::catalog::CreateServicePayload,
            models::catalog::UpdateServicePayload,

            // --- Matrículas ---
            models::enrollment::EnrollmentStatus,
            models::enrollment::BillingType,
            models::enrollment::BillingModel,
            models::enrollment::RecurrenceInterval,
            models::enrollment::ScheduleFrequency,
            models::enrollment::Enrollment,
            models::enrollment::ChargeSchedule,
            models::enrollment::ServiceSchedule,
            models::enrollment::EnrollmentDetail,
            models::enrollment::ChargeSchedulePayload,
            models::enrollment::ServiceSchedulePayload,
            models::enrollment::CreateEnrollmentPayload,
            models::enrollment::UpdateEnrollmentPayload,
            models::enrollment::PauseEnrollmentPayload,

            // --- Cobranças ---
            models::charge::ChargeStatus,
            models::charge::Charge,
            models::charge::CreateChargePayload,
            models::charge::RefundChargePayload,
            models::charge::ExceptionAction,
            models::charge::ChargeException,
            models::charge::CreateChargeExceptionPayload,

            // --- Dashboard ---
            models::dashboard::FinancialSummary,
            models::dashboard::OperationalMetrics,
        )
    ),
    tags(
        (name = "Catálogo", description = "Serviços oferecidos pelo prestador"),
        (name = "Organizações", description = "Organizações e sub-prestadores"),
        (name = "Matrículas", description = "Vínculo cliente-serviço com agendas"),
        (name = "Cobranças", description = "Cobranças e ciclo de pagamento"),
        (name = "Exceções de Cobrança", description = "Sobrescritas pontuais da agenda de cobrança"),
        (name = "Dashboard", description = "Indicadores financeiros e operacionais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
