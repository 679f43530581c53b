// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de domínio violadas (ex: "POSTPONE exige newDueDate")
    #[error("Regra de negócio violada: {0}")]
    DomainValidation(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Assinatura de webhook que não confere nunca é processada
    #[error("Assinatura de webhook inválida")]
    WebhookSignatureInvalid,

    // Falha inesperada do gateway de pagamento. O detalhe vai para o log,
    // nunca para o chamador.
    #[error("Erro no gateway de pagamento: {0}")]
    GatewayError(anyhow::Error),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DomainValidation(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string()),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string()),
            AppError::WebhookSignatureInvalid => (StatusCode::UNAUTHORIZED, "Assinatura de webhook inválida.".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Você não tem permissão para realizar esta ação.".to_string()),
            AppError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity)),

            // Falhas do gateway viram 500 genérico: o detalhe fica no log.
            AppError::GatewayError(ref e) => {
                tracing::error!("Erro no gateway de pagamento: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Falha ao comunicar com o provedor de pagamento.".to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
