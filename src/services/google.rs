// src/services/google.rs
//
// Cliente HTTP do Google: troca de código OAuth2, refresh de token e
// eventos do calendário `primary`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIME_ZONE: &str = "America/Sao_Paulo";
pub const EVENT_DURATION_HOURS: i64 = 1;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CALENDAR_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Error)]
pub enum GoogleError {
    // 404/410: o evento foi apagado direto no Google
    #[error("o evento não existe mais no Google Calendar")]
    EventGone,

    // 401 numa chamada da API: o access token expirou antes do previsto
    #[error("access token recusado pelo Google")]
    Unauthorized,

    // 400/401 no endpoint de token: consentimento revogado ou código inválido
    #[error("concessão OAuth rejeitada pelo Google: {0}")]
    GrantRejected(String),

    #[error("Google respondeu {status}: {body}")]
    Api { status: u16, body: String },

    #[error("falha de comunicação com o Google: {0}")]
    Http(#[from] reqwest::Error),
}

/// Tokens devolvidos pelo Google numa troca de código ou num refresh.
/// `refresh_token` só vem quando o Google decide rotacioná-lo.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl CalendarEvent {
    /// Monta o evento de um agendamento: duração fixa de 1 hora, sem checagem
    /// de conflito.
    pub fn for_appointment(
        titulo: &str,
        descricao: Option<&str>,
        nome_cliente: Option<&str>,
        data: NaiveDate,
        horario: NaiveTime,
    ) -> Self {
        let start = NaiveDateTime::new(data, horario);
        let end = start + Duration::hours(EVENT_DURATION_HOURS);

        let mut linhas = Vec::new();
        if let Some(nome) = nome_cliente {
            linhas.push(format!("Cliente: {}", nome));
        }
        if let Some(texto) = descricao.filter(|d| !d.trim().is_empty()) {
            linhas.push(texto.to_string());
        }

        Self {
            summary: titulo.to_string(),
            description: if linhas.is_empty() { None } else { Some(linhas.join("\n")) },
            start: event_time(start),
            end: event_time(end),
        }
    }
}

fn event_time(at: NaiveDateTime) -> EventDateTime {
    EventDateTime {
        date_time: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        time_zone: TIME_ZONE.to_string(),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoogleApi: Send + Sync {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<IssuedTokens, GoogleError>;
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, GoogleError>;
    async fn insert_event(&self, access_token: &str, event: &CalendarEvent) -> Result<String, GoogleError>;
    async fn update_event(&self, access_token: &str, event_id: &str, event: &CalendarEvent) -> Result<(), GoogleError>;
    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), GoogleError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    calendar_url: String,
}

impl GoogleClient {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            calendar_url: GOOGLE_CALENDAR_URL.to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.calendar_url)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<IssuedTokens, GoogleError> {
        let response = self.http.post(&self.token_url).form(params).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::GrantRejected(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Api { status: status.as_u16(), body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(IssuedTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expiry: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

/// Traduz respostas de erro da Calendar API.
pub fn classify_calendar_error(status: StatusCode, body: String) -> GoogleError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => GoogleError::EventGone,
        StatusCode::UNAUTHORIZED => GoogleError::Unauthorized,
        _ => GoogleError::Api { status: status.as_u16(), body },
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GoogleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_calendar_error(status, body))
}

#[async_trait]
impl GoogleApi for GoogleClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<IssuedTokens, GoogleError> {
        self.request_token(&[
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, GoogleError> {
        self.request_token(&[
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn insert_event(&self, access_token: &str, event: &CalendarEvent) -> Result<String, GoogleError> {
        let response = self.http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        let inserted: InsertedEvent = ensure_success(response).await?.json().await?;
        Ok(inserted.id)
    }

    async fn update_event(&self, access_token: &str, event_id: &str, event: &CalendarEvent) -> Result<(), GoogleError> {
        let response = self.http
            .put(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), GoogleError> {
        let response = self.http
            .delete(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn event_lasts_one_hour_in_sao_paulo() {
        let event = CalendarEvent::for_appointment(
            "Reunião",
            Some("Revisão do contrato"),
            Some("Maria"),
            data("2024-06-01"),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        );

        assert_eq!(event.start.date_time, "2024-06-01T14:00:00");
        assert_eq!(event.end.date_time, "2024-06-01T15:00:00");
        assert_eq!(event.start.time_zone, "America/Sao_Paulo");
        assert_eq!(event.description.as_deref(), Some("Cliente: Maria\nRevisão do contrato"));
    }

    #[test]
    fn late_appointment_ends_on_the_next_day() {
        let event = CalendarEvent::for_appointment(
            "Plantão",
            None,
            None,
            data("2024-12-31"),
            NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
        );

        assert_eq!(event.end.date_time, "2025-01-01T00:30:00");
        assert_eq!(event.description, None);
    }

    #[test]
    fn serializes_with_google_field_names() {
        let event = CalendarEvent::for_appointment(
            "Reunião",
            None,
            None,
            data("2024-06-01"),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["start"]["dateTime"], "2024-06-01T09:00:00");
        assert_eq!(json["end"]["timeZone"], "America/Sao_Paulo");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn missing_events_are_classified_as_gone() {
        assert!(matches!(classify_calendar_error(StatusCode::GONE, String::new()), GoogleError::EventGone));
        assert!(matches!(classify_calendar_error(StatusCode::NOT_FOUND, String::new()), GoogleError::EventGone));
        assert!(matches!(classify_calendar_error(StatusCode::UNAUTHORIZED, String::new()), GoogleError::Unauthorized));
        assert!(matches!(
            classify_calendar_error(StatusCode::FORBIDDEN, "quota".into()),
            GoogleError::Api { status: 403, .. }
        ));
    }
}
