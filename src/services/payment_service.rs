// src/services/payment_service.rs
//
// Glue com o gateway de pagamento: checkout de assinatura do prestador,
// relatórios financeiros da conta conectada e o despacho dos eventos de
// webhook para as transições de Cobrança e de Prestador.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProviderRepository, UserRepository},
    gateway::stripe::{
        AccountObject, CheckoutSessionObject, DisputeObject, InvoiceObject, PaymentIntentObject,
        RefundedChargeObject, StripeEvent, SubscriptionObject, parse_object,
    },
    gateway::{CheckoutMode, CheckoutRequest, GatewayBalance, GatewayPayout, PaymentGateway, from_cents},
    models::provider::{Provider, ProviderStatus},
    services::charge_service::ChargeService,
};

#[derive(Clone)]
pub struct PaymentService {
    provider_repo: ProviderRepository,
    user_repo: UserRepository,
    charge_service: ChargeService,
    gateway: Arc<dyn PaymentGateway>,
    provider_plan_price_id: String,
    checkout_success_url: String,
    checkout_cancel_url: String,
}

impl PaymentService {
    pub fn new(
        provider_repo: ProviderRepository,
        user_repo: UserRepository,
        charge_service: ChargeService,
        gateway: Arc<dyn PaymentGateway>,
        provider_plan_price_id: String,
        checkout_success_url: String,
        checkout_cancel_url: String,
    ) -> Self {
        Self {
            provider_repo,
            user_repo,
            charge_service,
            gateway,
            provider_plan_price_id,
            checkout_success_url,
            checkout_cancel_url,
        }
    }

    async fn resolve_provider(&self, user_id: Uuid) -> Result<Provider, AppError> {
        self.provider_repo
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound("Prestador"))
    }

    // =========================================================================
    //  OPERAÇÕES DO PRESTADOR
    // =========================================================================

    // Checkout da assinatura da plataforma (plano do prestador)
    pub async fn subscription_checkout(&self, user_id: Uuid) -> Result<String, AppError> {
        let provider = self.resolve_provider(user_id).await?;

        // Garante o customer no gateway antes do checkout
        let customer_id = match &provider.payment_customer_id {
            Some(id) => id.clone(),
            None => {
                let user = self
                    .user_repo
                    .find_by_id(provider.user_id)
                    .await?
                    .ok_or(AppError::NotFound("Usuário"))?;

                let customer_id = self.gateway.create_customer(&provider.title, &user.email).await?;
                self.provider_repo
                    .set_payment_customer(provider.id, &customer_id)
                    .await?;
                customer_id
            }
        };

        let session = self
            .gateway
            .generate_checkout(CheckoutRequest {
                mode: CheckoutMode::Subscription,
                customer_id: Some(customer_id),
                price_id: Some(self.provider_plan_price_id.clone()),
                product_name: None,
                amount_cents: None,
                currency: "brl".to_string(),
                connected_account: None,
                metadata: vec![("providerId".to_string(), provider.id.to_string())],
                success_url: self.checkout_success_url.clone(),
                cancel_url: self.checkout_cancel_url.clone(),
            })
            .await?;

        session.url.ok_or_else(|| {
            AppError::GatewayError(anyhow::anyhow!("checkout criado sem url de pagamento"))
        })
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<GatewayBalance, AppError> {
        let provider = self.resolve_provider(user_id).await?;
        let account = provider.provider_payment_id.as_deref().ok_or_else(|| {
            AppError::DomainValidation("O prestador não possui conta conectada.".to_string())
        })?;
        self.gateway.get_balance(account).await
    }

    pub async fn payouts(&self, user_id: Uuid) -> Result<Vec<GatewayPayout>, AppError> {
        let provider = self.resolve_provider(user_id).await?;
        let account = provider.provider_payment_id.as_deref().ok_or_else(|| {
            AppError::DomainValidation("O prestador não possui conta conectada.".to_string())
        })?;
        self.gateway.list_payouts(account, 20).await
    }

    // =========================================================================
    //  DESPACHO DE WEBHOOKS: eventos de plataforma
    // =========================================================================

    pub async fn handle_platform_event(&self, event: StripeEvent) -> Result<(), AppError> {
        tracing::info!("Webhook de plataforma recebido: {} ({})", event.event_type, event.id);

        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = parse_object(&event)?;
                self.on_checkout_completed(session).await
            }
            "payment_intent.succeeded" => {
                let intent: PaymentIntentObject = parse_object(&event)?;
                self.charge_service.confirm_payment_by_gateway_id(&intent.id).await
            }
            "payment_intent.payment_failed" => {
                let intent: PaymentIntentObject = parse_object(&event)?;
                self.charge_service.fail_payment_by_gateway_id(&intent.id).await
            }
            "charge.refunded" => {
                let charge: RefundedChargeObject = parse_object(&event)?;
                let Some(payment_intent) = charge.payment_intent.clone() else {
                    tracing::warn!("charge.refunded sem payment intent; ignorado");
                    return Ok(());
                };
                let refund_amount: Decimal = from_cents(charge.latest_refund_amount());
                self.charge_service
                    .refund_by_gateway_id(&payment_intent, refund_amount)
                    .await
            }
            "charge.dispute.created" => {
                let dispute: DisputeObject = parse_object(&event)?;
                let Some(payment_intent) = dispute.payment_intent else {
                    tracing::warn!("Disputa {} sem payment intent; ignorada", dispute.id);
                    return Ok(());
                };
                self.charge_service.dispute_by_gateway_id(&payment_intent).await
            }
            "invoice.paid" => {
                let invoice: InvoiceObject = parse_object(&event)?;
                self.update_provider_status_from_billing(&invoice, ProviderStatus::Active)
                    .await
            }
            "invoice.payment_failed" => {
                let invoice: InvoiceObject = parse_object(&event)?;
                self.update_provider_status_from_billing(&invoice, ProviderStatus::PendingPayment)
                    .await
            }
            "customer.subscription.deleted" => {
                let subscription: SubscriptionObject = parse_object(&event)?;
                if let Some(provider) = self.provider_repo.find_by_subscription(&subscription.id).await? {
                    self.provider_repo.set_status(provider.id, ProviderStatus::Inactive).await?;
                    tracing::info!("Prestador {} inativado (assinatura encerrada)", provider.id);
                }
                Ok(())
            }
            other => {
                tracing::debug!("Evento de plataforma ignorado: {}", other);
                Ok(())
            }
        }
    }

    async fn on_checkout_completed(&self, session: CheckoutSessionObject) -> Result<(), AppError> {
        match session.mode.as_str() {
            // Assinatura do prestador concluída: ativa e guarda o vínculo
            "subscription" => {
                let Some(customer) = session.customer.as_deref() else {
                    tracing::warn!("Checkout de assinatura sem customer; ignorado");
                    return Ok(());
                };
                let Some(provider) = self.provider_repo.find_by_payment_customer(customer).await? else {
                    tracing::warn!("Checkout de assinatura para customer desconhecido: {}", customer);
                    return Ok(());
                };

                if let Some(subscription_id) = session.subscription.as_deref() {
                    self.provider_repo.set_subscription(provider.id, subscription_id).await?;
                }
                self.provider_repo.set_status(provider.id, ProviderStatus::Active).await?;
                tracing::info!("Prestador {} ativado via assinatura", provider.id);
                Ok(())
            }
            // Pagamento avulso de uma cobrança
            "payment" => {
                let Some(charge_id) = session
                    .metadata
                    .get("chargeId")
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                else {
                    tracing::warn!("Checkout {} sem chargeId nos metadados; ignorado", session.id);
                    return Ok(());
                };

                self.charge_service
                    .confirm_payment_by_charge_id(charge_id, session.payment_intent.as_deref())
                    .await
            }
            other => {
                tracing::debug!("Checkout em modo não tratado: {}", other);
                Ok(())
            }
        }
    }

    async fn update_provider_status_from_billing(
        &self,
        invoice: &InvoiceObject,
        status: ProviderStatus,
    ) -> Result<(), AppError> {
        let provider = match &invoice.subscription {
            Some(subscription_id) => self.provider_repo.find_by_subscription(subscription_id).await?,
            None => None,
        };

        // Fallback pelo customer quando a fatura não referencia assinatura
        let provider = match provider {
            Some(p) => Some(p),
            None => match &invoice.customer {
                Some(customer_id) => self.provider_repo.find_by_payment_customer(customer_id).await?,
                None => None,
            },
        };

        match provider {
            Some(provider) => {
                self.provider_repo.set_status(provider.id, status).await?;
                tracing::info!("Prestador {} -> {:?} (webhook de fatura)", provider.id, status);
            }
            None => tracing::warn!("Fatura sem prestador correspondente; ignorada"),
        }
        Ok(())
    }

    // =========================================================================
    //  DESPACHO DE WEBHOOKS: eventos de conta conectada
    // =========================================================================

    pub async fn handle_connect_event(&self, event: StripeEvent) -> Result<(), AppError> {
        tracing::info!("Webhook de connect recebido: {} ({})", event.event_type, event.id);

        match event.event_type.as_str() {
            "account.updated" => {
                let account: AccountObject = parse_object(&event)?;
                let Some(provider) = self.provider_repo.find_by_connected_account(&account.id).await? else {
                    tracing::warn!("account.updated para conta desconhecida: {}", account.id);
                    return Ok(());
                };

                let status = if account.charges_enabled && account.payouts_enabled {
                    ProviderStatus::Active
                } else {
                    ProviderStatus::PendingVerification
                };
                self.provider_repo.set_status(provider.id, status).await?;
                tracing::info!("Prestador {} -> {:?} (capabilities da conta)", provider.id, status);
                Ok(())
            }
            other => {
                tracing::debug!("Evento de connect ignorado: {}", other);
                Ok(())
            }
        }
    }
}
