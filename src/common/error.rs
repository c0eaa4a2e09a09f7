// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// 401 = "quem é você" (credencial ausente/inválida);
// 403 = "sei quem você é, mas não pode" — nunca misturar os dois.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Autenticação necessária")]
    AuthenticationRequired,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // Sempre precedido de um registro de auditoria (ver AuthorizationService)
    #[error("Permissão negada: {action}")]
    PermissionDenied { action: String },

    #[error("Papel insuficiente: requer {required} ou superior")]
    InsufficientRole { required: String },

    // Guarda de lockout: um admin nunca altera o próprio papel/status
    #[error("Não é permitido alterar o próprio papel ou status")]
    SelfMutation,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Falha do serviço externo de geração de texto. Nunca chega ao
    // dashboard: o serviço de insights converte em conteúdo placeholder.
    #[error("Erro no serviço externo: {0}")]
    ExternalService(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),

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

            AppError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::PermissionDenied { action } => (
                StatusCode::FORBIDDEN,
                format!("Permissão negada: a ação '{action}' requer privilégios maiores."),
            ),
            AppError::InsufficientRole { required } => (
                StatusCode::FORBIDDEN,
                format!("Esta ação requer o papel {required} ou superior."),
            ),
            AppError::SelfMutation => (
                StatusCode::BAD_REQUEST,
                "Você não pode alterar o seu próprio papel ou status.".to_string(),
            ),
            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "Este e-mail já está em uso.".to_string(),
            ),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{entity} não encontrado(a)."))
            }

            // Todos os outros erros viram 500; o `tracing` loga a mensagem
            // detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
