// src/gateway/stripe.rs
//
// Cliente mínimo para a API do Stripe (https://api.stripe.com/v1).
// Autorização: Bearer com a chave secreta; corpo form-urlencoded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;

use crate::common::error::AppError;
use crate::gateway::{
    CheckoutMode, CheckoutRequest, CheckoutSession, GatewayBalance, GatewayPayout, GatewayRefund,
    PaymentGateway, from_cents,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

// Tolerância do timestamp da assinatura (5 minutos)
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
        }
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<String, AppError> {
        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::GatewayError(e.into()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| AppError::GatewayError(e.into()))?;

        if !status.is_success() {
            return Err(AppError::GatewayError(anyhow::anyhow!(
                "stripe respondeu status={} body={}",
                status.as_u16(),
                body
            )));
        }

        Ok(body)
    }

    async fn get(
        &self,
        path: &str,
        connected_account: Option<&str>,
    ) -> Result<String, AppError> {
        let mut request = self
            .http
            .get(format!("{STRIPE_API_BASE}{path}"))
            .bearer_auth(&self.secret_key);

        // Escopo de conta conectada (Stripe Connect)
        if let Some(account) = connected_account {
            request = request.header("Stripe-Account", account);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::GatewayError(e.into()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| AppError::GatewayError(e.into()))?;

        if !status.is_success() {
            return Err(AppError::GatewayError(anyhow::anyhow!(
                "stripe respondeu status={} body={}",
                status.as_u16(),
                body
            )));
        }

        Ok(body)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str::<T>(body)
        .map_err(|e| AppError::GatewayError(anyhow::anyhow!("resposta inválida do stripe: {e}; body={body}")))
}

// --- Tipos de resposta da API ---

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
    payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    available: Vec<BalanceEntry>,
    pending: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
struct PayoutResponse {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    arrival_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PayoutListResponse {
    data: Vec<PayoutResponse>,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    amount: i64,
    status: String,
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_customer(&self, name: &str, email: &str) -> Result<String, AppError> {
        let params = vec![
            ("name".to_string(), name.to_string()),
            ("email".to_string(), email.to_string()),
        ];
        let body = self.post_form("/customers", &params).await?;
        let customer: CustomerResponse = parse_json(&body)?;
        Ok(customer.id)
    }

    async fn generate_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession, AppError> {
        let mut params: Vec<(String, String)> = vec![
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        if let Some(customer_id) = request.customer_id {
            params.push(("customer".to_string(), customer_id));
        }

        match request.mode {
            CheckoutMode::Subscription => {
                let price_id = request.price_id.ok_or_else(|| {
                    AppError::GatewayError(anyhow::anyhow!("checkout de assinatura sem price_id"))
                })?;
                params.push(("mode".to_string(), "subscription".to_string()));
                params.push(("line_items[0][price]".to_string(), price_id));
            }
            CheckoutMode::Payment => {
                let amount_cents = request.amount_cents.ok_or_else(|| {
                    AppError::GatewayError(anyhow::anyhow!("checkout de pagamento sem valor"))
                })?;
                params.push(("mode".to_string(), "payment".to_string()));
                params.push((
                    "line_items[0][price_data][currency]".to_string(),
                    request.currency.clone(),
                ));
                params.push((
                    "line_items[0][price_data][unit_amount]".to_string(),
                    amount_cents.to_string(),
                ));
                params.push((
                    "line_items[0][price_data][product_data][name]".to_string(),
                    request.product_name.unwrap_or_else(|| "Cobrança".to_string()),
                ));

                // Split de receita: o repasse vai direto para a conta conectada
                if let Some(account) = request.connected_account {
                    params.push((
                        "payment_intent_data[transfer_data][destination]".to_string(),
                        account,
                    ));
                }
            }
        }

        for (key, value) in request.metadata {
            params.push((format!("metadata[{key}]"), value));
        }

        let body = self.post_form("/checkout/sessions", &params).await?;
        let session: CheckoutSessionResponse = parse_json(&body)?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
            payment_intent_id: session.payment_intent,
        })
    }

    async fn get_balance(&self, connected_account: &str) -> Result<GatewayBalance, AppError> {
        let body = self.get("/balance", Some(connected_account)).await?;
        let balance: BalanceResponse = parse_json(&body)?;

        let available = balance.available.first();
        let pending = balance.pending.first();

        Ok(GatewayBalance {
            available: from_cents(available.map(|e| e.amount).unwrap_or(0)),
            pending: from_cents(pending.map(|e| e.amount).unwrap_or(0)),
            currency: available
                .or(pending)
                .map(|e| e.currency.clone())
                .unwrap_or_else(|| "brl".to_string()),
        })
    }

    async fn list_payouts(&self, connected_account: &str, limit: u32) -> Result<Vec<GatewayPayout>, AppError> {
        let body = self
            .get(&format!("/payouts?limit={limit}"), Some(connected_account))
            .await?;
        let payouts: PayoutListResponse = parse_json(&body)?;

        Ok(payouts
            .data
            .into_iter()
            .map(|p| GatewayPayout {
                id: p.id,
                amount: from_cents(p.amount),
                currency: p.currency,
                status: p.status,
                arrival_date: p.arrival_date.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            })
            .collect())
    }

    async fn refund_charge(
        &self,
        payment_intent_id: &str,
        amount_cents: Option<i64>,
    ) -> Result<GatewayRefund, AppError> {
        let mut params = vec![("payment_intent".to_string(), payment_intent_id.to_string())];
        if let Some(cents) = amount_cents {
            params.push(("amount".to_string(), cents.to_string()));
        }

        let body = self.post_form("/refunds", &params).await?;
        let refund: RefundResponse = parse_json(&body)?;

        Ok(GatewayRefund {
            id: refund.id,
            amount: from_cents(refund.amount),
            status: refund.status,
        })
    }
}

// =============================================================================
//  WEBHOOKS
// =============================================================================

// Envelope de evento entregue pelo Stripe
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
    // Presente nos eventos de conta conectada
    pub account: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

// Objetos que o dispatcher extrai de data.object conforme o tipo do evento

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub mode: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RefundEntryObject {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct RefundListObject {
    #[serde(default)]
    pub data: Vec<RefundEntryObject>,
}

#[derive(Debug, Deserialize)]
pub struct RefundedChargeObject {
    pub payment_intent: Option<String>,
    pub amount_refunded: i64,
    pub refunds: Option<RefundListObject>,
}

impl RefundedChargeObject {
    // O valor DESTE reembolso: o Stripe manda a lista com o mais recente
    // primeiro; na ausência dela, cai no acumulado.
    pub fn latest_refund_amount(&self) -> i64 {
        self.refunds
            .as_ref()
            .and_then(|list| list.data.first())
            .map(|r| r.amount)
            .unwrap_or(self.amount_refunded)
    }
}

#[derive(Debug, Deserialize)]
pub struct DisputeObject {
    pub id: String,
    pub payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceObject {
    pub customer: Option<String>,
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountObject {
    pub id: String,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
}

pub fn parse_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, AppError> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        AppError::GatewayError(anyhow::anyhow!(
            "payload inesperado no evento {}: {e}",
            event.event_type
        ))
    })
}

// Verifica o cabeçalho Stripe-Signature ("t=...,v1=...") contra o segredo.
// HMAC-SHA256 sobre "{timestamp}.{payload}", com tolerância de 5 minutos.
// Recebe `now` como argumento para ser testável.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), AppError> {
    let mut timestamp: Option<i64> = None;
    let mut v1_signature: Option<&str> = None;

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => v1_signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(AppError::WebhookSignatureInvalid)?;
    let v1_signature = v1_signature.ok_or(AppError::WebhookSignatureInvalid)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        tracing::warn!(timestamp, now, "Timestamp do webhook fora da tolerância");
        return Err(AppError::WebhookSignatureInvalid);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::WebhookSignatureInvalid)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let computed = hex::encode(mac.finalize().into_bytes());

    if computed != v1_signature {
        return Err(AppError::WebhookSignatureInvalid);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_teste";

    // Monta um cabeçalho válido para o payload, como o Stripe faria
    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn aceita_assinatura_valida() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let header = sign(payload, 1_700_000_000, SECRET);

        assert!(verify_signature(payload, &header, SECRET, 1_700_000_000).is_ok());
    }

    #[test]
    fn rejeita_assinatura_adulterada() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let mut header = sign(payload, 1_700_000_000, SECRET);
        // Troca o último caractere do v1
        header.pop();
        header.push('0');

        let result = verify_signature(payload, &header, SECRET, 1_700_000_000);
        assert!(matches!(result, Err(AppError::WebhookSignatureInvalid)));
    }

    #[test]
    fn rejeita_payload_alterado() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        let tampered = br#"{"id":"evt_2","type":"payment_intent.succeeded"}"#;

        let result = verify_signature(tampered, &header, SECRET, 1_700_000_000);
        assert!(matches!(result, Err(AppError::WebhookSignatureInvalid)));
    }

    #[test]
    fn rejeita_timestamp_fora_da_tolerancia() {
        let payload = br#"{}"#;
        let header = sign(payload, 1_700_000_000, SECRET);

        // 10 minutos depois
        let result = verify_signature(payload, &header, SECRET, 1_700_000_600);
        assert!(matches!(result, Err(AppError::WebhookSignatureInvalid)));
    }

    #[test]
    fn rejeita_cabecalho_malformado() {
        let payload = br#"{}"#;
        let result = verify_signature(payload, "sem-formato-algum", SECRET, 1_700_000_000);
        assert!(matches!(result, Err(AppError::WebhookSignatureInvalid)));
    }

    #[test]
    fn desserializa_evento_de_checkout() {
        let raw = r#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "mode": "payment",
                    "customer": "cus_9",
                    "subscription": null,
                    "payment_intent": "pi_55",
                    "metadata": {"chargeId": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}
                }
            }
        }"#;

        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: CheckoutSessionObject = parse_object(&event).unwrap();
        assert_eq!(session.mode, "payment");
        assert_eq!(session.payment_intent.as_deref(), Some("pi_55"));
        assert_eq!(
            session.metadata.get("chargeId").map(String::as_str),
            Some("3fa85f64-5717-4562-b3fc-2c963f66afa6")
        );
    }

    #[test]
    fn extrai_valor_do_ultimo_reembolso() {
        let charge = RefundedChargeObject {
            payment_intent: Some("pi_1".to_string()),
            amount_refunded: 10_000,
            refunds: Some(RefundListObject {
                data: vec![RefundEntryObject { amount: 4_000 }],
            }),
        };
        assert_eq!(charge.latest_refund_amount(), 4_000);

        // Sem a lista, cai no acumulado
        let charge = RefundedChargeObject {
            payment_intent: Some("pi_1".to_string()),
            amount_refunded: 10_000,
            refunds: None,
        };
        assert_eq!(charge.latest_refund_amount(), 10_000);
    }
}
