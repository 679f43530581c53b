// src/services/enrollment_service.rs
//
// O coração do sistema: a matrícula nasce junto com a sua agenda de
// cobrança (1:1) e as linhas de agenda do serviço, numa única transação.
// Qualquer falha no meio desfaz tudo.

use chrono::{NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ClientRepository, EnrollmentRepository, ProviderRepository},
    models::enrollment::{
        BillingModel, ChargeSchedulePayload, CreateEnrollmentPayload, Enrollment,
        EnrollmentDetail, EnrollmentStatus, NewServiceSchedule, PauseEnrollmentPayload,
        ScheduleFrequency, ServiceSchedulePayload, UpdateEnrollmentPayload,
    },
};

#[derive(Clone)]
pub struct EnrollmentService {
    enrollment_repo: EnrollmentRepository,
    catalog_repo: CatalogRepository,
    client_repo: ClientRepository,
    provider_repo: ProviderRepository,
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(
        enrollment_repo: EnrollmentRepository,
        catalog_repo: CatalogRepository,
        client_repo: ClientRepository,
        provider_repo: ProviderRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            enrollment_repo,
            catalog_repo,
            client_repo,
            provider_repo,
            pool,
        }
    }

    async fn resolve_provider_id(&self, user_id: Uuid) -> Result<Uuid, AppError> {
        let provider = self
            .provider_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))?;
        Ok(provider.id)
    }

    // Matrícula do prestador, ou NotFound (dono errado não descobre que o id existe)
    async fn resolve_owned_enrollment(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Enrollment, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;
        self.enrollment_repo
            .find_for_provider(enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Matrícula"))
    }

    pub async fn create_enrollment(
        &self,
        user_id: Uuid,
        payload: CreateEnrollmentPayload,
    ) -> Result<EnrollmentDetail, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        // 1. Resolve e autoriza o serviço; resolve o cliente
        let service = self
            .catalog_repo
            .find_by_id(payload.service_id)
            .await?
            .filter(|s| s.provider_id == provider_id)
            .ok_or(AppError::NotFound("Serviço"))?;

        let client = self
            .client_repo
            .find_by_id(payload.client_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        // 2. Toda a validação acontece ANTES de abrir a transação:
        //    nenhuma linha é gravada se o payload for inválido.
        validate_charge_schedule(&payload.charge_schedule)?;
        let schedule_rows = expand_service_schedules(&payload.service_schedule)?;

        let price = payload.price.unwrap_or(service.default_price);
        if price < Decimal::new(1, 2) {
            return Err(AppError::DomainValidation(
                "O preço da matrícula deve ser de no mínimo 0.01.".to_string(),
            ));
        }

        // 3. Matrícula + agenda de cobrança + agendas do serviço, atomicamente
        let mut tx = self.pool.begin().await?;

        let enrollment = self
            .enrollment_repo
            .insert_enrollment(
                &mut *tx,
                service.id,
                client.id,
                price,
                payload.start_date,
                payload.end_date,
                payload.billing_type,
            )
            .await?;

        let charge_schedule = self
            .enrollment_repo
            .insert_charge_schedule(
                &mut *tx,
                enrollment.id,
                payload.charge_schedule.billing_model,
                payload.charge_schedule.recurrence_interval,
                payload.charge_schedule.charge_day,
                payload.charge_schedule.due_date,
            )
            .await?;

        let mut service_schedules = Vec::with_capacity(schedule_rows.len());
        for row in &schedule_rows {
            let schedule = self
                .enrollment_repo
                .insert_service_schedule(&mut *tx, enrollment.id, row)
                .await?;
            service_schedules.push(schedule);
        }

        tx.commit().await?;

        tracing::info!(
            "Matrícula {} criada ({} agendas de serviço)",
            enrollment.id,
            service_schedules.len()
        );

        Ok(EnrollmentDetail {
            enrollment,
            charge_schedule: Some(charge_schedule),
            service_schedules,
        })
    }

    // Atualização com o mesmo padrão de substituição das dependentes:
    // agenda de cobrança é atualizada in-place (1:1); agendas do serviço
    // são apagadas e re-expandidas. Tudo dentro de uma transação, então
    // uma falha no meio não deixa a matrícula sem agenda.
    pub async fn update_enrollment(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
        payload: UpdateEnrollmentPayload,
    ) -> Result<EnrollmentDetail, AppError> {
        self.resolve_owned_enrollment(user_id, enrollment_id).await?;

        if let Some(charge_schedule) = &payload.charge_schedule {
            validate_charge_schedule(charge_schedule)?;
        }
        let new_schedule_rows = match &payload.service_schedule {
            Some(service_schedule) => Some(expand_service_schedules(service_schedule)?),
            None => None,
        };

        if let Some(price) = payload.price {
            if price < Decimal::new(1, 2) {
                return Err(AppError::DomainValidation(
                    "O preço da matrícula deve ser de no mínimo 0.01.".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let enrollment = self
            .enrollment_repo
            .update_enrollment(
                &mut *tx,
                enrollment_id,
                payload.price,
                payload.start_date,
                payload.end_date,
                payload.status,
                payload.billing_type,
            )
            .await?;

        if let Some(charge_schedule) = &payload.charge_schedule {
            self.enrollment_repo
                .update_charge_schedule(
                    &mut *tx,
                    enrollment_id,
                    charge_schedule.billing_model,
                    charge_schedule.recurrence_interval,
                    charge_schedule.charge_day,
                    charge_schedule.due_date,
                )
                .await?;
        }

        if let Some(rows) = &new_schedule_rows {
            self.enrollment_repo
                .delete_service_schedules(&mut *tx, enrollment_id)
                .await?;
            for row in rows {
                self.enrollment_repo
                    .insert_service_schedule(&mut *tx, enrollment_id, row)
                    .await?;
            }
        }

        tx.commit().await?;

        self.hydrate(enrollment).await
    }

    pub async fn get_detail(&self, user_id: Uuid, enrollment_id: Uuid) -> Result<EnrollmentDetail, AppError> {
        let enrollment = self.resolve_owned_enrollment(user_id, enrollment_id).await?;
        self.hydrate(enrollment).await
    }

    pub async fn list_for_provider(&self, user_id: Uuid) -> Result<Vec<Enrollment>, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;
        self.enrollment_repo.list_by_provider(provider_id).await
    }

    pub async fn list_for_client(&self, user_id: Uuid) -> Result<Vec<Enrollment>, AppError> {
        let client = self
            .client_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.enrollment_repo.list_by_client(client.id).await
    }

    pub async fn cancel(&self, user_id: Uuid, enrollment_id: Uuid) -> Result<Enrollment, AppError> {
        let enrollment = self.resolve_owned_enrollment(user_id, enrollment_id).await?;

        if matches!(enrollment.status, EnrollmentStatus::Cancelled) {
            return Err(AppError::DomainValidation(
                "A matrícula já está cancelada.".to_string(),
            ));
        }

        self.enrollment_repo
            .set_status(
                enrollment_id,
                EnrollmentStatus::Cancelled,
                Some(Utc::now().date_naive()),
            )
            .await
    }

    pub async fn pause(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
        payload: PauseEnrollmentPayload,
    ) -> Result<Enrollment, AppError> {
        let enrollment = self.resolve_owned_enrollment(user_id, enrollment_id).await?;

        if !matches!(enrollment.status, EnrollmentStatus::Active) {
            return Err(AppError::DomainValidation(
                "Apenas matrículas ativas podem ser pausadas.".to_string(),
            ));
        }
        if payload.pause_end_date <= payload.pause_start_date {
            return Err(AppError::DomainValidation(
                "O fim da pausa deve ser depois do início.".to_string(),
            ));
        }

        self.enrollment_repo
            .set_pause_window(enrollment_id, payload.pause_start_date, payload.pause_end_date)
            .await
    }

    // Leituras avulsas das agendas, com a mesma regra de posse
    pub async fn get_charge_schedule(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<crate::models::enrollment::ChargeSchedule, AppError> {
        self.resolve_owned_enrollment(user_id, enrollment_id).await?;
        self.enrollment_repo
            .find_charge_schedule(enrollment_id)
            .await?
            .ok_or(AppError::NotFound("Agenda de cobrança"))
    }

    pub async fn list_schedules(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Vec<crate::models::enrollment::ServiceSchedule>, AppError> {
        self.resolve_owned_enrollment(user_id, enrollment_id).await?;
        self.enrollment_repo.list_service_schedules(enrollment_id).await
    }

    async fn hydrate(&self, enrollment: Enrollment) -> Result<EnrollmentDetail, AppError> {
        let charge_schedule = self.enrollment_repo.find_charge_schedule(enrollment.id).await?;
        let service_schedules = self.enrollment_repo.list_service_schedules(enrollment.id).await?;

        Ok(EnrollmentDetail {
            enrollment,
            charge_schedule,
            service_schedules,
        })
    }
}

// =============================================================================
//  REGRAS PURAS (validação e expansão)
// =============================================================================

// RECURRING exige intervalo de recorrência; ONE_TIME exige data de vencimento.
pub fn validate_charge_schedule(payload: &ChargeSchedulePayload) -> Result<(), AppError> {
    match payload.billing_model {
        BillingModel::Recurring if payload.recurrence_interval.is_none() => {
            Err(AppError::DomainValidation(
                "Cobrança RECURRING exige um intervalo de recorrência.".to_string(),
            ))
        }
        BillingModel::OneTime if payload.due_date.is_none() => Err(AppError::DomainValidation(
            "Cobrança ONE_TIME exige uma data de vencimento.".to_string(),
        )),
        _ => Ok(()),
    }
}

// Expande o DTO simplificado em linhas concretas de agenda.
// Falha de validação acontece antes de qualquer linha ser persistida.
pub fn expand_service_schedules(
    payload: &ServiceSchedulePayload,
) -> Result<Vec<NewServiceSchedule>, AppError> {
    let start = parse_time(&payload.start_time)?;
    let end = parse_time(&payload.end_time)?;
    if end <= start {
        return Err(AppError::DomainValidation(
            "O horário final deve ser depois do inicial.".to_string(),
        ));
    }

    let base = NewServiceSchedule {
        frequency: payload.frequency,
        day_of_week: None,
        day_of_month: None,
        start_time: payload.start_time.clone(),
        end_time: payload.end_time.clone(),
    };

    match payload.frequency {
        ScheduleFrequency::Daily => Ok(vec![base]),

        ScheduleFrequency::Weekly => {
            let days = payload.days_of_week.as_deref().unwrap_or(&[]);
            if days.is_empty() {
                return Err(AppError::DomainValidation(
                    "Agenda WEEKLY exige ao menos um dia da semana.".to_string(),
                ));
            }

            let mut rows = Vec::with_capacity(days.len());
            for &day in days {
                if !(0..=6).contains(&day) {
                    return Err(AppError::DomainValidation(format!(
                        "Dia da semana inválido: {day}."
                    )));
                }
                rows.push(NewServiceSchedule {
                    day_of_week: Some(day),
                    ..base.clone()
                });
            }
            Ok(rows)
        }

        ScheduleFrequency::Monthly => {
            let day = payload.day_of_month.ok_or_else(|| {
                AppError::DomainValidation("Agenda MONTHLY exige o dia do mês.".to_string())
            })?;
            if !(1..=28).contains(&day) {
                return Err(AppError::DomainValidation(
                    "O dia do mês deve estar entre 1 e 28.".to_string(),
                ));
            }
            Ok(vec![NewServiceSchedule {
                day_of_month: Some(day),
                ..base
            }])
        }

        // Aceita no enum mas sem expansão definida: rejeitamos em vez de
        // gravar silenciosamente zero linhas.
        ScheduleFrequency::CustomDays => Err(AppError::DomainValidation(
            "A frequência CUSTOM_DAYS ainda não é suportada.".to_string(),
        )),
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::DomainValidation(format!("Horário inválido: '{value}' (use HH:MM).")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_payload(days: Option<Vec<i16>>) -> ServiceSchedulePayload {
        ServiceSchedulePayload {
            frequency: ScheduleFrequency::Weekly,
            days_of_week: days,
            day_of_month: None,
            start_time: "08:00".to_string(),
            end_time: "09:00".to_string(),
        }
    }

    #[test]
    fn weekly_gera_uma_linha_por_dia() {
        let rows = expand_service_schedules(&weekly_payload(Some(vec![1, 3]))).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day_of_week, Some(1));
        assert_eq!(rows[1].day_of_week, Some(3));
        assert!(rows.iter().all(|r| r.day_of_month.is_none()));
    }

    #[test]
    fn weekly_sem_dias_falha_antes_de_persistir() {
        assert!(matches!(
            expand_service_schedules(&weekly_payload(Some(vec![]))),
            Err(AppError::DomainValidation(_))
        ));
        assert!(matches!(
            expand_service_schedules(&weekly_payload(None)),
            Err(AppError::DomainValidation(_))
        ));
    }

    #[test]
    fn weekly_rejeita_dia_fora_do_intervalo() {
        assert!(matches!(
            expand_service_schedules(&weekly_payload(Some(vec![1, 7]))),
            Err(AppError::DomainValidation(_))
        ));
    }

    #[test]
    fn monthly_exige_dia_do_mes() {
        let mut payload = weekly_payload(None);
        payload.frequency = ScheduleFrequency::Monthly;
        payload.day_of_month = None;

        assert!(matches!(
            expand_service_schedules(&payload),
            Err(AppError::DomainValidation(_))
        ));

        payload.day_of_month = Some(10);
        let rows = expand_service_schedules(&payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].day_of_month, Some(10));
    }

    #[test]
    fn daily_gera_uma_linha_sem_qualificador() {
        let mut payload = weekly_payload(None);
        payload.frequency = ScheduleFrequency::Daily;

        let rows = expand_service_schedules(&payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].day_of_week, None);
        assert_eq!(rows[0].day_of_month, None);
    }

    #[test]
    fn custom_days_e_rejeitado() {
        let mut payload = weekly_payload(None);
        payload.frequency = ScheduleFrequency::CustomDays;

        assert!(matches!(
            expand_service_schedules(&payload),
            Err(AppError::DomainValidation(_))
        ));
    }

    #[test]
    fn horario_final_antes_do_inicial_e_rejeitado() {
        let mut payload = weekly_payload(Some(vec![1]));
        payload.start_time = "10:00".to_string();
        payload.end_time = "09:00".to_string();

        assert!(matches!(
            expand_service_schedules(&payload),
            Err(AppError::DomainValidation(_))
        ));
    }

    #[test]
    fn horario_malformado_e_rejeitado() {
        let mut payload = weekly_payload(Some(vec![1]));
        payload.start_time = "8h".to_string();

        assert!(matches!(
            expand_service_schedules(&payload),
            Err(AppError::DomainValidation(_))
        ));
    }

    fn charge_schedule(model: BillingModel) -> ChargeSchedulePayload {
        ChargeSchedulePayload {
            billing_model: model,
            recurrence_interval: None,
            charge_day: 5,
            due_date: None,
        }
    }

    #[test]
    fn recurring_exige_intervalo() {
        let payload = charge_schedule(BillingModel::Recurring);
        assert!(matches!(
            validate_charge_schedule(&payload),
            Err(AppError::DomainValidation(_))
        ));

        let mut ok = charge_schedule(BillingModel::Recurring);
        ok.recurrence_interval = Some(crate::models::enrollment::RecurrenceInterval::Monthly);
        assert!(validate_charge_schedule(&ok).is_ok());
    }

    #[test]
    fn one_time_exige_vencimento() {
        let payload = charge_schedule(BillingModel::OneTime);
        assert!(matches!(
            validate_charge_schedule(&payload),
            Err(AppError::DomainValidation(_))
        ));

        let mut ok = charge_schedule(BillingModel::OneTime);
        ok.due_date = Some(chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert!(validate_charge_schedule(&ok).is_ok());
    }
}
