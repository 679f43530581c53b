// src/gateway.rs
//
// Contrato abstrato do gateway de pagamento. Os serviços dependem deste
// trait, nunca do cliente Stripe concreto.

pub mod stripe;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::common::error::AppError;

// Valores monetários trafegam em centavos no gateway
pub fn to_cents(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::DomainValidation("Valor monetário inválido.".to_string()))
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    pub customer_id: Option<String>,
    // Assinatura: preço pré-cadastrado na plataforma
    pub price_id: Option<String>,
    // Pagamento avulso: descrição + valor em centavos
    pub product_name: Option<String>,
    pub amount_cents: Option<i64>,
    pub currency: String,
    // Conta conectada que recebe o repasse (split de receita)
    pub connected_account: Option<String>,
    pub metadata: Vec<(String, String)>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayBalance {
    pub available: Decimal,
    pub pending: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayout {
    pub id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub arrival_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct GatewayRefund {
    pub id: String,
    pub amount: Decimal,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    // Cria um customer no gateway e retorna o id externo
    async fn create_customer(&self, name: &str, email: &str) -> Result<String, AppError>;

    // Gera uma sessão de checkout (pagamento avulso ou assinatura)
    async fn generate_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession, AppError>;

    // Relatórios financeiros da conta conectada (somente leitura)
    async fn get_balance(&self, connected_account: &str) -> Result<GatewayBalance, AppError>;
    async fn list_payouts(&self, connected_account: &str, limit: u32) -> Result<Vec<GatewayPayout>, AppError>;

    // Reembolso total ou parcial de um payment intent
    async fn refund_charge(
        &self,
        payment_intent_id: &str,
        amount_cents: Option<i64>,
    ) -> Result<GatewayRefund, AppError>;
}
