// src/models/config.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Linha completa de `configuracoes`; os tokens nunca saem da API
#[derive(Debug, Clone, FromRow)]
pub struct ConfigRow {
    pub usuario_id: i32,
    pub notificacoes_ativas: bool,
    pub google_calendar_ativo: bool,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_token_expiry: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Configuration {
    pub usuario_id: i32,
    #[schema(example = true)]
    pub notificacoes_ativas: bool,
    #[schema(example = false)]
    pub google_calendar_ativo: bool,
    // Existe um refresh token salvo?
    #[schema(example = false)]
    pub google_conectado: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigRow> for Configuration {
    fn from(row: ConfigRow) -> Self {
        Self {
            usuario_id: row.usuario_id,
            notificacoes_ativas: row.notificacoes_ativas,
            google_calendar_ativo: row.google_calendar_ativo,
            google_conectado: row.google_refresh_token.is_some(),
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateConfigPayload {
    pub notificacoes_ativas: Option<bool>,
    pub google_calendar_ativo: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExchangeCodePayload {
    #[validate(
        required(message = "O código de autorização é obrigatório."),
        length(min = 1, message = "O código de autorização é obrigatório.")
    )]
    pub code: Option<String>,

    // Alguns fluxos do app usam um redirect próprio; sem ele vale o configurado
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoogleStatus {
    pub conectado: bool,
}
