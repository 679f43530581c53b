// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod events;
mod gateway;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let (app_state, events_rx) = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Consumidor de eventos de domínio (notificações) numa task própria
    tokio::spawn(app_state.notification_service.clone().run(events_rx));

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/register/provider", post(handlers::auth::register_provider))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::users::get_me).put(handlers::users::update_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let provider_routes = Router::new()
        .route("/me", get(handlers::providers::get_me).put(handlers::providers::update_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let client_routes = Router::new()
        .route("/", post(handlers::clients::create_client).get(handlers::clients::list_clients))
        .route("/me", get(handlers::clients::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let service_routes = Router::new()
        .route("/", post(handlers::services::create_service).get(handlers::services::list_services))
        .route(
            "/{id}",
            get(handlers::services::get_service)
                .put(handlers::services::update_service)
                .delete(handlers::services::delete_service),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let organization_routes = Router::new()
        .route("/", post(handlers::organizations::create_organization))
        .route("/me", get(handlers::organizations::get_my_organization))
        .route(
            "/{id}/invite-sub-provider",
            post(handlers::organizations::invite_sub_provider),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let enrollment_routes = Router::new()
        .route(
            "/",
            post(handlers::enrollments::create_enrollment).get(handlers::enrollments::list_enrollments),
        )
        .route(
            "/{id}",
            get(handlers::enrollments::get_enrollment).put(handlers::enrollments::update_enrollment),
        )
        .route("/{id}/cancel", post(handlers::enrollments::cancel_enrollment))
        .route("/{id}/pause", post(handlers::enrollments::pause_enrollment))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let charge_routes = Router::new()
        .route("/", post(handlers::charges::create_charge).get(handlers::charges::list_charges))
        .route("/{id}/checkout", post(handlers::charges::checkout_charge))
        .route("/{id}/mark-paid", post(handlers::charges::mark_paid))
        .route("/{id}/mark-failed", post(handlers::charges::mark_failed))
        .route("/{id}/refund", post(handlers::charges::refund_charge))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let charge_exception_routes = Router::new()
        .route(
            "/",
            post(handlers::charge_exceptions::create_exception)
                .get(handlers::charge_exceptions::list_exceptions),
        )
        .route(
            "/{id}",
            axum::routing::delete(handlers::charge_exceptions::delete_exception),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let schedule_routes = Router::new()
        .route("/charge-schedules", get(handlers::schedules::get_charge_schedule))
        .route("/service-schedules", get(handlers::schedules::list_service_schedules))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let payment_routes = Router::new()
        .route(
            "/subscription/provider",
            post(handlers::payments::provider_subscription_checkout),
        )
        .route("/balance", get(handlers::payments::get_balance))
        .route("/payouts", get(handlers::payments::list_payouts))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let dashboard_routes = Router::new()
        .route("/financial-summary", get(handlers::dashboard::financial_summary))
        .route("/operational-metrics", get(handlers::dashboard::operational_metrics))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Webhooks ficam fora do auth_guard: a autenticação deles é a assinatura
    let webhook_routes = Router::new()
        .route("/stripe", post(handlers::webhooks::stripe_platform))
        .route("/stripe/connect", post(handlers::webhooks::stripe_connect));

    let bind_address = app_state.settings.bind_address.clone();

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/providers", provider_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/services", service_routes)
        .nest("/api/organizations", organization_routes)
        .nest("/api/enrollments", enrollment_routes)
        .nest("/api/charges", charge_routes)
        .nest("/api/charge-exceptions", charge_exception_routes)
        .nest("/api", schedule_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/webhooks", webhook_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_address)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", bind_address);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
