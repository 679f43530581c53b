// src/events.rs

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

// Eventos de domínio emitidos no caminho de escrita e consumidos pela
// camada de notificação. É a costura que desacopla cobrança/webhook do
// fan-out de e-mail/WhatsApp.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    PaymentReceived {
        charge_id: Uuid,
        provider_user_id: Uuid,
        client_user_id: Uuid,
        amount: Decimal,
    },
    RefundProcessed {
        charge_id: Uuid,
        provider_user_id: Uuid,
        client_user_id: Uuid,
        amount: Decimal,
        total_refunded: Decimal,
    },
    DisputeCreated {
        charge_id: Uuid,
        provider_user_id: Uuid,
    },
    SubProviderInvited {
        organization_id: Uuid,
        user_id: Uuid,
        email: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    // Emissão nunca falha o caminho de escrita: se o consumidor caiu,
    // apenas registramos e seguimos.
    pub fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("Falha ao emitir evento de domínio: {}", e);
        }
    }
}
