// src/models/enrollment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "enrollment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
    Cancelled,
    Completed,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "billing_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Unique,
    Installment,
    Recurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "billing_model", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingModel {
    Recurring,
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "recurrence_interval", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceInterval {
    Weekly,
    Biweekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "schedule_frequency", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleFrequency {
    Daily,
    Weekly,
    Monthly,
    CustomDays,
}

// --- Structs ---

// A entidade central: vincula um Cliente a um Serviço
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "200.00")]
    pub price: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,

    pub status: EnrollmentStatus,
    pub billing_type: Option<BillingType>,

    #[schema(value_type = Option<String>, format = Date)]
    pub pause_start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub pause_end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 1:1 com a matrícula: como e quando a cobrança recorre
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSchedule {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub billing_model: BillingModel,
    pub recurrence_interval: Option<RecurrenceInterval>,
    #[schema(example = 5)]
    pub charge_day: i16,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// N:1 com a matrícula: quando o serviço em si acontece
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSchedule {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub frequency: ScheduleFrequency,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "09:00")]
    pub end_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Matrícula hidratada com suas relações (retorno da criação / consulta)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub charge_schedule: Option<ChargeSchedule>,
    pub service_schedules: Vec<ServiceSchedule>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSchedulePayload {
    pub billing_model: BillingModel,
    pub recurrence_interval: Option<RecurrenceInterval>,

    #[validate(range(min = 1, max = 28, message = "O dia de cobrança deve estar entre 1 e 28."))]
    #[serde(default = "default_charge_day")]
    #[schema(example = 5)]
    pub charge_day: i16,

    #[schema(value_type = Option<String>, format = Date, example = "2025-06-01")]
    pub due_date: Option<NaiveDate>,
}

fn default_charge_day() -> i16 {
    1
}

// DTO simplificado de agenda: o front manda a frequência e os qualificadores,
// o backend expande em linhas concretas de service_schedules.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSchedulePayload {
    pub frequency: ScheduleFrequency,

    // 0 = domingo ... 6 = sábado. Obrigatório (e não vazio) quando WEEKLY.
    #[schema(example = json!([1, 3]))]
    pub days_of_week: Option<Vec<i16>>,

    #[validate(range(min = 1, max = 28, message = "O dia do mês deve estar entre 1 e 28."))]
    pub day_of_month: Option<i16>,

    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "09:00")]
    pub end_time: String,
}

// Linha pronta para inserção, resultado da expansão do DTO simplificado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceSchedule {
    pub frequency: ScheduleFrequency,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentPayload {
    pub service_id: Uuid,
    pub client_id: Uuid,

    // Quando ausente, herda o preço padrão do serviço
    #[schema(example = "200.00")]
    pub price: Option<Decimal>,

    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,

    pub billing_type: Option<BillingType>,

    #[validate(nested)]
    pub charge_schedule: ChargeSchedulePayload,
    #[validate(nested)]
    pub service_schedule: ServiceSchedulePayload,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentPayload {
    pub price: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub status: Option<EnrollmentStatus>,
    pub billing_type: Option<BillingType>,

    #[validate(nested)]
    pub charge_schedule: Option<ChargeSchedulePayload>,
    #[validate(nested)]
    pub service_schedule: Option<ServiceSchedulePayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PauseEnrollmentPayload {
    #[schema(value_type = String, format = Date, example = "2025-07-01")]
    pub pause_start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-07-31")]
    pub pause_end_date: NaiveDate,
}
