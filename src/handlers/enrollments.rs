// src/handlers/enrollments.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::marker::PhantomData;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::enrollment::{
        CreateEnrollmentPayload, Enrollment, EnrollmentDetail, PauseEnrollmentPayload,
        UpdateEnrollmentPayload,
    },
};

// POST /api/enrollments
#[utoipa::path(
    post,
    path = "/api/enrollments",
    tag = "Matrículas",
    request_body = CreateEnrollmentPayload,
    responses(
        (status = 201, description = "Matrícula criada com agendas", body = EnrollmentDetail),
        (status = 400, description = "Agenda inválida"),
        (status = 404, description = "Serviço ou cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_enrollment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateEnrollmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state
        .enrollment_service
        .create_enrollment(user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/enrollments: prestador vê as suas; cliente vê as dele
#[utoipa::path(
    get,
    path = "/api/enrollments",
    tag = "Matrículas",
    responses(
        (status = 200, description = "Lista de matrículas", body = Vec<Enrollment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_enrollments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let enrollments = if user.role.is_provider() {
        app_state.enrollment_service.list_for_provider(user.id).await?
    } else {
        app_state.enrollment_service.list_for_client(user.id).await?
    };

    Ok((StatusCode::OK, Json(enrollments)))
}

// GET /api/enrollments/{id}
#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    tag = "Matrículas",
    params(("id" = Uuid, Path, description = "ID da matrícula")),
    responses(
        (status = 200, description = "Matrícula com agendas", body = EnrollmentDetail),
        (status = 404, description = "Matrícula não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_enrollment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentDetail>, AppError> {
    let detail = app_state.enrollment_service.get_detail(user.id, id).await?;
    Ok(Json(detail))
}

// PUT /api/enrollments/{id}
#[utoipa::path(
    put,
    path = "/api/enrollments/{id}",
    tag = "Matrículas",
    params(("id" = Uuid, Path, description = "ID da matrícula")),
    request_body = UpdateEnrollmentPayload,
    responses(
        (status = 200, description = "Matrícula atualizada", body = EnrollmentDetail)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_enrollment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnrollmentPayload>,
) -> Result<Json<EnrollmentDetail>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state
        .enrollment_service
        .update_enrollment(user.id, id, payload)
        .await?;

    Ok(Json(detail))
}

// POST /api/enrollments/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/cancel",
    tag = "Matrículas",
    params(("id" = Uuid, Path, description = "ID da matrícula")),
    responses(
        (status = 200, description = "Matrícula cancelada", body = Enrollment)
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_enrollment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = app_state.enrollment_service.cancel(user.id, id).await?;
    Ok(Json(enrollment))
}

// POST /api/enrollments/{id}/pause
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/pause",
    tag = "Matrículas",
    params(("id" = Uuid, Path, description = "ID da matrícula")),
    request_body = PauseEnrollmentPayload,
    responses(
        (status = 200, description = "Matrícula pausada", body = Enrollment),
        (status = 400, description = "Janela de pausa inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn pause_enrollment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PauseEnrollmentPayload>,
) -> Result<Json<Enrollment>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let enrollment = app_state.enrollment_service.pause(user.id, id, payload).await?;
    Ok(Json(enrollment))
}
