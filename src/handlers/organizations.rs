// src/handlers/organizations.rs

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
        roles::{MasterAccess, ProviderAccess, RequireRole, ensure_organization_scope},
    },
    models::auth::User,
    models::organization::{
        CreateOrganizationPayload, InviteSubProviderPayload, Organization, OrganizationDetail,
    },
};

// POST /api/organizations
#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Organizações",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Organização criada", body = Organization),
        (status = 409, description = "O usuário já possui uma organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let organization = app_state
        .organization_service
        .create_organization(&user, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(organization)))
}

// GET /api/organizations/me
#[utoipa::path(
    get,
    path = "/api/organizations/me",
    tag = "Organizações",
    responses(
        (status = 200, description = "Organização do usuário com membros", body = OrganizationDetail),
        (status = 404, description = "Usuário sem organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
) -> Result<Json<OrganizationDetail>, AppError> {
    let detail = app_state.organization_service.get_for_user(&user).await?;
    Ok(Json(detail))
}

// POST /api/organizations/{id}/invite-sub-provider
#[utoipa::path(
    post,
    path = "/api/organizations/{id}/invite-sub-provider",
    tag = "Organizações",
    params(("id" = Uuid, Path, description = "ID da organização")),
    request_body = InviteSubProviderPayload,
    responses(
        (status = 201, description = "Sub-prestador convidado", body = User),
        (status = 400, description = "E-mail já pertence à organização"),
        (status = 403, description = "Apenas o dono convida")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_sub_provider(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<MasterAccess>,
    Path(organization_id): Path<Uuid>,
    Json(payload): Json<InviteSubProviderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    ensure_organization_scope(&user, organization_id)?;

    let invited = app_state
        .organization_service
        .invite_sub_provider(&user, organization_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(invited)))
}
