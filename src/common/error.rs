use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::google::GoogleError;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    // Refresh token revogado: o app precisa pedir uma nova autorização
    #[error("Integração com o Google Calendar expirada")]
    GoogleReconnectRequired,

    #[error("Erro do Google: {0}")]
    Google(#[from] GoogleError),

    // Rejeição do provedor de NFS-e, com o detalhe legível devolvido por ele
    #[error("{0}")]
    FiscalProvider(String),

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{} não encontrado.", entity))
    }

    /// Mensagens de validação agrupadas por campo, em ordem alfabética.
    fn validation_details(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
        let mut details = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("O campo '{}' é inválido.", field),
                })
                .collect();
            details.insert(field.to_string(), messages);
        }
        details
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let details = AppError::validation_details(&errors);
                let message = details
                    .values()
                    .flatten()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("; ");
                let body = Json(json!({
                    "error": message,
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::GoogleReconnectRequired => {
                let body = Json(json!({
                    "error": "Sua conexão com o Google Calendar expirou. Conecte sua conta novamente.",
                    "code": "GOOGLE_RECONNECT_REQUIRED",
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Acesso negado a este recurso.".to_string()),
            AppError::FiscalProvider(detail) => {
                tracing::error!("Erro do provedor fiscal: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, detail)
            }

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
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

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(required(message = "O nome é obrigatório."))]
        nome: Option<String>,
        #[validate(email(message = "O e-mail fornecido é inválido."))]
        email: String,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_are_concatenated_into_a_400() {
        let errors = Payload { nome: None, email: "invalido".into() }.validate().unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "O e-mail fornecido é inválido.; O nome é obrigatório.");
        assert_eq!(body["details"]["nome"][0], "O nome é obrigatório.");
    }

    #[tokio::test]
    async fn reconnect_required_carries_a_distinct_code() {
        let response = AppError::GoogleReconnectRequired.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "GOOGLE_RECONNECT_REQUIRED");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Ocorreu um erro inesperado.");
    }

    #[tokio::test]
    async fn fiscal_errors_surface_the_provider_detail() {
        let response = AppError::FiscalProvider("CNPJ do tomador inválido".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "CNPJ do tomador inválido");
    }
}
