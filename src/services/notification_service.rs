// src/services/notification_service.rs
//
// Consumidor dos eventos de domínio. Persiste o outbox de notificações
// e registra o fan-out; a entrega real (e-mail / WhatsApp) fica a cargo
// de um worker externo que lê a tabela.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    events::DomainEvent,
    models::notification::NotificationChannel,
};

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    // Loop do consumidor: roda numa task própria até o canal fechar.
    // Erros são logados e o loop continua; notificação nunca derruba nada.
    pub async fn run(self, mut rx: UnboundedReceiver<DomainEvent>) {
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.dispatch(event).await {
                tracing::error!("Falha ao processar evento de notificação: {}", e);
            }
        }
        tracing::info!("Canal de eventos fechado; consumidor de notificações encerrado.");
    }

    async fn dispatch(&self, event: DomainEvent) -> Result<(), AppError> {
        match event {
            DomainEvent::PaymentReceived {
                charge_id,
                provider_user_id,
                client_user_id,
                amount,
            } => {
                let subject = "Pagamento recebido";
                let body = format!("O pagamento de R$ {amount} da cobrança {charge_id} foi confirmado.");

                self.repo
                    .insert(provider_user_id, NotificationChannel::Email, subject, &body)
                    .await?;
                self.repo
                    .insert(client_user_id, NotificationChannel::Whatsapp, subject, &body)
                    .await?;

                tracing::info!("Notificação de pagamento enviada (cobrança {})", charge_id);
            }

            DomainEvent::RefundProcessed {
                charge_id,
                provider_user_id,
                client_user_id,
                amount,
                total_refunded,
            } => {
                let subject = "Reembolso processado";
                let body = format!(
                    "Reembolso de R$ {amount} na cobrança {charge_id} (total reembolsado: R$ {total_refunded})."
                );

                self.repo
                    .insert(provider_user_id, NotificationChannel::Email, subject, &body)
                    .await?;
                self.repo
                    .insert(client_user_id, NotificationChannel::Email, subject, &body)
                    .await?;

                tracing::info!("Notificação de reembolso enviada (cobrança {})", charge_id);
            }

            // Disputa pede reconciliação manual: só o prestador é avisado
            DomainEvent::DisputeCreated {
                charge_id,
                provider_user_id,
            } => {
                let subject = "Disputa aberta";
                let body = format!(
                    "A cobrança {charge_id} entrou em disputa no gateway. Verifique o painel para reconciliar."
                );

                self.repo
                    .insert(provider_user_id, NotificationChannel::Email, subject, &body)
                    .await?;

                tracing::warn!("Disputa aberta na cobrança {}", charge_id);
            }

            DomainEvent::SubProviderInvited {
                organization_id,
                user_id,
                email,
            } => {
                let subject = "Convite para organização";
                let body = format!("Você foi convidado(a) a integrar a organização {organization_id}.");

                self.repo
                    .insert(user_id, NotificationChannel::Email, subject, &body)
                    .await?;

                tracing::info!("Convite registrado para {} (org {})", email, organization_id);
            }
        }

        Ok(())
    }
}
