// src/handlers/schedules.rs

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ProviderAccess, RequireRole},
    },
    models::enrollment::{ChargeSchedule, ServiceSchedule},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub enrollment_id: Uuid,
}

// GET /api/charge-schedules?enrollmentId=...
pub async fn get_charge_schedule(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ChargeSchedule>, AppError> {
    let schedule = app_state
        .enrollment_service
        .get_charge_schedule(user.id, query.enrollment_id)
        .await?;
    Ok(Json(schedule))
}

// GET /api/service-schedules?enrollmentId=...
pub async fn list_service_schedules(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    RequireRole(PhantomData): RequireRole<ProviderAccess>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ServiceSchedule>>, AppError> {
    let schedules = app_state
        .enrollment_service
        .list_schedules(user.id, query.enrollment_id)
        .await?;
    Ok(Json(schedules))
}
