// src/services/push.rs
//
// Envio de notificações pelo serviço de push da Expo.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Limite de mensagens por requisição aceito pela Expo.
pub const EXPO_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Expo respondeu {status}: {body}")]
    Api { status: u16, body: String },

    #[error("falha de comunicação com a Expo: {0}")]
    Http(#[from] reqwest::Error),
}

/// `ExponentPushToken[...]` ou `ExpoPushToken[...]`.
pub fn is_expo_push_token(token: &str) -> bool {
    let inner = token
        .strip_prefix("ExponentPushToken[")
        .or_else(|| token.strip_prefix("ExpoPushToken["))
        .and_then(|rest| rest.strip_suffix(']'));
    matches!(inner, Some(id) if !id.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub sound: &'static str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// Resposta da Expo para cada mensagem do lote, na mesma ordem.
#[derive(Debug, Clone, Deserialize)]
pub struct PushTicket {
    pub status: String,
    pub message: Option<String>,
}

impl PushTicket {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    data: Vec<PushTicket>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Envia um lote (no máximo `EXPO_BATCH_SIZE` mensagens).
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, PushError>;
}

#[derive(Clone)]
pub struct ExpoPushClient {
    http: reqwest::Client,
    access_token: Option<String>,
}

impl ExpoPushClient {
    pub fn new(http: reqwest::Client, access_token: Option<String>) -> Self {
        Self { http, access_token }
    }
}

#[async_trait]
impl PushSender for ExpoPushClient {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, PushError> {
        let mut request = self.http
            .post(EXPO_PUSH_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(messages);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Api { status: status.as_u16(), body });
        }

        let parsed: PushResponse = response.json().await?;
        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_expo_token_prefixes() {
        assert!(is_expo_push_token("ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]"));
        assert!(is_expo_push_token("ExpoPushToken[abc123]"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(!is_expo_push_token(""));
        assert!(!is_expo_push_token("ExponentPushToken[]"));
        assert!(!is_expo_push_token("ExponentPushToken[abc"));
        assert!(!is_expo_push_token("fcm:abc123"));
    }

    #[test]
    fn message_serializes_in_expo_format() {
        let message = PushMessage {
            to: "ExpoPushToken[abc]".into(),
            title: "Estoque baixo".into(),
            body: "Filtro de óleo".into(),
            sound: "default",
            data: Value::Null,
        };
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["to"], "ExpoPushToken[abc]");
        assert_eq!(json["sound"], "default");
        assert!(json.get("data").is_none());
    }
}
