// src/services/charge_service.rs
//
// Máquina de estados da cobrança e regras de reembolso. As transições
// chegam por dois caminhos: operações manuais do prestador e eventos
// de webhook do gateway (via PaymentService).

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ChargeRepository, EnrollmentRepository, ProviderRepository},
    events::{DomainEvent, EventBus},
    gateway::{CheckoutMode, CheckoutRequest, PaymentGateway, to_cents},
    models::charge::{
        Charge, ChargeException, ChargeStatus, CreateChargeExceptionPayload, CreateChargePayload,
        ExceptionAction, RefundChargePayload,
    },
};

#[derive(Clone)]
pub struct ChargeService {
    charge_repo: ChargeRepository,
    enrollment_repo: EnrollmentRepository,
    provider_repo: ProviderRepository,
    gateway: Arc<dyn PaymentGateway>,
    events: EventBus,
    checkout_success_url: String,
    checkout_cancel_url: String,
}

impl ChargeService {
    pub fn new(
        charge_repo: ChargeRepository,
        enrollment_repo: EnrollmentRepository,
        provider_repo: ProviderRepository,
        gateway: Arc<dyn PaymentGateway>,
        events: EventBus,
        checkout_success_url: String,
        checkout_cancel_url: String,
    ) -> Self {
        Self {
            charge_repo,
            enrollment_repo,
            provider_repo,
            gateway,
            events,
            checkout_success_url,
            checkout_cancel_url,
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

    // Cobrança cujo serviço pertence ao prestador, ou NotFound
    async fn resolve_owned_charge(&self, user_id: Uuid, charge_id: Uuid) -> Result<Charge, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        let charge = self
            .charge_repo
            .find_by_id(charge_id)
            .await?
            .ok_or(AppError::NotFound("Cobrança"))?;

        self.enrollment_repo
            .find_for_provider(charge.enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Cobrança"))?;

        Ok(charge)
    }

    // =========================================================================
    //  OPERAÇÕES DO PRESTADOR
    // =========================================================================

    pub async fn create_charge(
        &self,
        user_id: Uuid,
        payload: CreateChargePayload,
    ) -> Result<Charge, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        self.enrollment_repo
            .find_for_provider(payload.enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Matrícula"))?;

        if payload.amount < Decimal::new(1, 2) {
            return Err(AppError::DomainValidation(
                "O valor da cobrança deve ser de no mínimo 0.01.".to_string(),
            ));
        }

        self.charge_repo
            .insert_charge(payload.enrollment_id, payload.amount, payload.due_date)
            .await
    }

    pub async fn list_by_enrollment(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Vec<Charge>, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        self.enrollment_repo
            .find_for_provider(enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Matrícula"))?;

        self.charge_repo.list_by_enrollment(enrollment_id).await
    }

    // Baixa manual: só uma cobrança PENDENTE pode virar PAGA
    pub async fn mark_paid(&self, user_id: Uuid, charge_id: Uuid) -> Result<Charge, AppError> {
        let charge = self.resolve_owned_charge(user_id, charge_id).await?;

        if charge.status != ChargeStatus::Pending {
            return Err(AppError::DomainValidation(
                "Apenas cobranças pendentes podem ser marcadas como pagas.".to_string(),
            ));
        }

        let charge = self.charge_repo.mark_paid(charge_id, Utc::now()).await?;
        self.emit_payment_received(&charge).await;
        Ok(charge)
    }

    // "Marcar como falha" é no-op fora de PENDING: nunca cancela uma
    // cobrança já paga. O guard está no próprio UPDATE.
    pub async fn mark_failed(&self, user_id: Uuid, charge_id: Uuid) -> Result<Charge, AppError> {
        let charge = self.resolve_owned_charge(user_id, charge_id).await?;

        if !charge.status.can_cancel() {
            tracing::warn!(
                "Cobrança {} não está pendente (status {:?}); cancelamento ignorado",
                charge_id,
                charge.status
            );
            return Ok(charge);
        }

        match self.charge_repo.cancel_if_pending(charge_id).await? {
            Some(cancelled) => Ok(cancelled),
            // Corrida com um webhook que pagou a cobrança nesse meio tempo
            None => Ok(charge),
        }
    }

    // Gera o checkout no gateway para uma cobrança pendente, com split
    // de receita para a conta conectada do prestador quando houver.
    pub async fn checkout(&self, user_id: Uuid, charge_id: Uuid) -> Result<Charge, AppError> {
        let provider = self
            .provider_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))?;

        let charge = self
            .charge_repo
            .find_by_id(charge_id)
            .await?
            .ok_or(AppError::NotFound("Cobrança"))?;

        self.enrollment_repo
            .find_for_provider(charge.enrollment_id, provider.id)
            .await?
            .ok_or(AppError::NotFound("Cobrança"))?;

        if charge.status != ChargeStatus::Pending {
            return Err(AppError::DomainValidation(
                "Só é possível gerar checkout para cobranças pendentes.".to_string(),
            ));
        }

        let session = self
            .gateway
            .generate_checkout(CheckoutRequest {
                mode: CheckoutMode::Payment,
                customer_id: None,
                price_id: None,
                product_name: Some(format!("Cobrança com vencimento em {}", charge.due_date)),
                amount_cents: Some(to_cents(charge.amount)?),
                currency: "brl".to_string(),
                connected_account: provider.provider_payment_id.clone(),
                metadata: vec![("chargeId".to_string(), charge.id.to_string())],
                success_url: self.checkout_success_url.clone(),
                cancel_url: self.checkout_cancel_url.clone(),
            })
            .await?;

        // Antes do checkout concluir o payment intent pode não existir;
        // guardamos o id da sessão e trocamos quando o webhook chegar.
        let gateway_id = session.payment_intent_id.unwrap_or(session.id);
        self.charge_repo
            .set_gateway_info(charge.id, &gateway_id, session.url.as_deref())
            .await
    }

    // Reembolso iniciado pelo prestador: chama o gateway e aplica a
    // regra de acumulação sobre refunded_amount.
    pub async fn refund(
        &self,
        user_id: Uuid,
        charge_id: Uuid,
        payload: RefundChargePayload,
    ) -> Result<Charge, AppError> {
        let charge = self.resolve_owned_charge(user_id, charge_id).await?;

        if !charge.status.can_refund() {
            return Err(AppError::DomainValidation(
                "Só é possível reembolsar cobranças pagas.".to_string(),
            ));
        }

        let remaining = charge.amount - charge.refunded_amount;
        let refund_amount = payload.amount.unwrap_or(remaining);

        if refund_amount <= Decimal::ZERO || refund_amount > remaining {
            return Err(AppError::DomainValidation(format!(
                "O valor do reembolso deve ser positivo e no máximo {remaining}."
            )));
        }

        let gateway_id = charge.payment_gateway_id.as_deref().ok_or_else(|| {
            AppError::DomainValidation(
                "Esta cobrança não tem pagamento registrado no gateway.".to_string(),
            )
        })?;

        self.gateway
            .refund_charge(gateway_id, Some(to_cents(refund_amount)?))
            .await?;

        self.apply_refund_event(&charge, refund_amount).await
    }

    // =========================================================================
    //  TRANSIÇÕES DIRIGIDAS POR WEBHOOK
    // =========================================================================

    pub async fn confirm_payment_by_gateway_id(&self, gateway_id: &str) -> Result<(), AppError> {
        let Some(charge) = self.charge_repo.find_by_gateway_id(gateway_id).await? else {
            tracing::warn!("Pagamento confirmado para payment intent desconhecido: {}", gateway_id);
            return Ok(());
        };

        // Entrega duplicada de webhook: já está paga, nada a fazer
        if charge.status != ChargeStatus::Pending {
            return Ok(());
        }

        let charge = self.charge_repo.mark_paid(charge.id, Utc::now()).await?;
        self.emit_payment_received(&charge).await;
        Ok(())
    }

    pub async fn confirm_payment_by_charge_id(
        &self,
        charge_id: Uuid,
        gateway_id: Option<&str>,
    ) -> Result<(), AppError> {
        let Some(charge) = self.charge_repo.find_by_id(charge_id).await? else {
            tracing::warn!("Checkout concluído para cobrança desconhecida: {}", charge_id);
            return Ok(());
        };

        // O payment intent definitivo só existe depois do checkout concluído
        if let Some(gateway_id) = gateway_id {
            self.charge_repo
                .set_gateway_info(charge.id, gateway_id, charge.payment_link.as_deref())
                .await?;
        }

        if charge.status != ChargeStatus::Pending {
            return Ok(());
        }

        let charge = self.charge_repo.mark_paid(charge.id, Utc::now()).await?;
        self.emit_payment_received(&charge).await;
        Ok(())
    }

    pub async fn fail_payment_by_gateway_id(&self, gateway_id: &str) -> Result<(), AppError> {
        let Some(charge) = self.charge_repo.find_by_gateway_id(gateway_id).await? else {
            tracing::warn!("Falha de pagamento para payment intent desconhecido: {}", gateway_id);
            return Ok(());
        };

        // CANCELED só é atingível a partir de PENDING
        if self.charge_repo.cancel_if_pending(charge.id).await?.is_none() {
            tracing::warn!(
                "Falha de pagamento ignorada: cobrança {} não está pendente",
                charge.id
            );
        }
        Ok(())
    }

    pub async fn refund_by_gateway_id(
        &self,
        gateway_id: &str,
        refund_amount: Decimal,
    ) -> Result<(), AppError> {
        let Some(charge) = self.charge_repo.find_by_gateway_id(gateway_id).await? else {
            tracing::warn!("Reembolso para payment intent desconhecido: {}", gateway_id);
            return Ok(());
        };

        self.apply_refund_event(&charge, refund_amount).await?;
        Ok(())
    }

    // Disputa entra de qualquer estado e pede reconciliação manual
    pub async fn dispute_by_gateway_id(&self, gateway_id: &str) -> Result<(), AppError> {
        let Some(charge) = self.charge_repo.find_by_gateway_id(gateway_id).await? else {
            tracing::warn!("Disputa para payment intent desconhecido: {}", gateway_id);
            return Ok(());
        };

        let charge = self.charge_repo.set_status(charge.id, ChargeStatus::InDispute).await?;

        if let Some(parties) = self.charge_repo.find_parties(charge.id).await? {
            self.events.emit(DomainEvent::DisputeCreated {
                charge_id: charge.id,
                provider_user_id: parties.provider_user_id,
            });
        }
        Ok(())
    }

    async fn apply_refund_event(&self, charge: &Charge, refund_amount: Decimal) -> Result<Charge, AppError> {
        let (total_refunded, new_status) =
            accumulate_refund(charge.amount, charge.refunded_amount, refund_amount);

        let updated = self
            .charge_repo
            .apply_refund(charge.id, total_refunded, new_status)
            .await?;

        if let Some(parties) = self.charge_repo.find_parties(updated.id).await? {
            self.events.emit(DomainEvent::RefundProcessed {
                charge_id: updated.id,
                provider_user_id: parties.provider_user_id,
                client_user_id: parties.client_user_id,
                amount: refund_amount,
                total_refunded,
            });
        }

        Ok(updated)
    }

    async fn emit_payment_received(&self, charge: &Charge) {
        match self.charge_repo.find_parties(charge.id).await {
            Ok(Some(parties)) => {
                self.events.emit(DomainEvent::PaymentReceived {
                    charge_id: charge.id,
                    provider_user_id: parties.provider_user_id,
                    client_user_id: parties.client_user_id,
                    amount: charge.amount,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Falha ao resolver partes da cobrança {}: {}", charge.id, e),
        }
    }

    // =========================================================================
    //  EXCEÇÕES DE COBRANÇA
    // =========================================================================

    pub async fn create_exception(
        &self,
        user_id: Uuid,
        payload: CreateChargeExceptionPayload,
    ) -> Result<ChargeException, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        self.enrollment_repo
            .find_for_provider(payload.enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Matrícula"))?;

        validate_exception(payload.action, payload.new_due_date.is_some(), payload.new_amount.is_some())?;

        self.charge_repo
            .insert_exception(
                payload.enrollment_id,
                payload.original_charge_date,
                payload.action,
                payload.new_due_date,
                payload.new_amount,
                payload.reason.as_deref(),
            )
            .await
    }

    pub async fn list_exceptions(
        &self,
        user_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Vec<ChargeException>, AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        self.enrollment_repo
            .find_for_provider(enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Matrícula"))?;

        self.charge_repo.list_exceptions(enrollment_id).await
    }

    pub async fn delete_exception(&self, user_id: Uuid, exception_id: Uuid) -> Result<(), AppError> {
        let provider_id = self.resolve_provider_id(user_id).await?;

        let exception = self
            .charge_repo
            .find_exception(exception_id)
            .await?
            .ok_or(AppError::NotFound("Exceção de cobrança"))?;

        self.enrollment_repo
            .find_for_provider(exception.enrollment_id, provider_id)
            .await?
            .ok_or(AppError::NotFound("Exceção de cobrança"))?;

        self.charge_repo.delete_exception(exception_id).await?;
        Ok(())
    }
}

// =============================================================================
//  REGRAS PURAS
// =============================================================================

// Acumulação de reembolso: soma o evento ao total anterior e decide o
// status final comparando com o valor da cobrança.
pub fn accumulate_refund(
    amount: Decimal,
    refunded_before: Decimal,
    refund_event: Decimal,
) -> (Decimal, ChargeStatus) {
    let total_refunded = refunded_before + refund_event;
    let status = if total_refunded >= amount {
        ChargeStatus::Refunded
    } else {
        ChargeStatus::PartiallyRefunded
    };
    (total_refunded, status)
}

// POSTPONE exige nova data; MODIFY_AMOUNT exige novo valor.
pub fn validate_exception(
    action: ExceptionAction,
    has_new_due_date: bool,
    has_new_amount: bool,
) -> Result<(), AppError> {
    match action {
        ExceptionAction::Postpone if !has_new_due_date => Err(AppError::DomainValidation(
            "A ação POSTPONE exige uma nova data de vencimento.".to_string(),
        )),
        ExceptionAction::ModifyAmount if !has_new_amount => Err(AppError::DomainValidation(
            "A ação MODIFY_AMOUNT exige um novo valor.".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn reembolso_parcial_depois_total() {
        // Cobrança de 100.00: reembolso de 40.00 -> PARTIALLY_REFUNDED
        let (total, status) = accumulate_refund(dec("100.00"), Decimal::ZERO, dec("40.00"));
        assert_eq!(total, dec("40.00"));
        assert_eq!(status, ChargeStatus::PartiallyRefunded);

        // Segundo evento de 60.00 -> REFUNDED com acumulado 100.00
        let (total, status) = accumulate_refund(dec("100.00"), total, dec("60.00"));
        assert_eq!(total, dec("100.00"));
        assert_eq!(status, ChargeStatus::Refunded);
    }

    #[test]
    fn reembolso_acima_do_valor_fecha_como_total() {
        let (total, status) = accumulate_refund(dec("50.00"), dec("30.00"), dec("25.00"));
        assert_eq!(total, dec("55.00"));
        assert_eq!(status, ChargeStatus::Refunded);
    }

    #[test]
    fn postpone_exige_nova_data() {
        assert!(matches!(
            validate_exception(ExceptionAction::Postpone, false, false),
            Err(AppError::DomainValidation(_))
        ));
        assert!(validate_exception(ExceptionAction::Postpone, true, false).is_ok());
    }

    #[test]
    fn modify_amount_exige_novo_valor() {
        assert!(matches!(
            validate_exception(ExceptionAction::ModifyAmount, false, false),
            Err(AppError::DomainValidation(_))
        ));
        assert!(validate_exception(ExceptionAction::ModifyAmount, false, true).is_ok());
    }

    #[test]
    fn skip_nao_exige_campos_extras() {
        assert!(validate_exception(ExceptionAction::Skip, false, false).is_ok());
    }
}
