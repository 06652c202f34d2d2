// src/models/scheduled_service.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::format;

// Mapeia o CREATE TYPE status_agendamento do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_agendamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Agendado,
    Concluido,
    Cancelado,
}

// Linha de `servicos_agendados` com o nome do cliente (JOIN em `clientes`)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduledService {
    pub id: i32,
    #[schema(ignore)]
    pub usuario_id: i32,
    pub cliente_id: i32,
    #[schema(example = "Maria da Silva")]
    pub nome_cliente: Option<String>,

    #[schema(example = "Reunião")]
    pub titulo: String,
    pub descricao: Option<String>,
    #[schema(value_type = String, format = Date, example = "2024-06-01")]
    pub data: NaiveDate,
    #[serde(with = "format::horario")]
    #[schema(value_type = String, example = "14:00")]
    pub horario: NaiveTime,
    pub status: AppointmentStatus,

    // Referência fraca para o evento espelhado no Google Calendar
    pub google_calendar_event_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateScheduledServicePayload {
    #[validate(required(message = "O cliente é obrigatório."))]
    #[schema(example = 1)]
    pub cliente_id: Option<i32>,

    #[validate(
        required(message = "O título é obrigatório."),
        length(min = 1, message = "O título é obrigatório.")
    )]
    #[schema(example = "Reunião")]
    pub titulo: Option<String>,

    pub descricao: Option<String>,

    #[validate(required(message = "A data é obrigatória."))]
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub data: Option<NaiveDate>,

    #[validate(required(message = "O horário é obrigatório."))]
    #[serde(default, deserialize_with = "format::horario_opcional::deserialize")]
    #[schema(value_type = Option<String>, example = "14:00")]
    pub horario: Option<NaiveTime>,

    pub status: Option<AppointmentStatus>,
}

// PUT: campos ausentes mantêm o valor atual
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduledServicePayload {
    pub cliente_id: Option<i32>,

    #[validate(length(min = 1, message = "O título não pode ficar vazio."))]
    pub titulo: Option<String>,

    pub descricao: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-06-02")]
    pub data: Option<NaiveDate>,

    #[serde(default, deserialize_with = "format::horario_opcional::deserialize")]
    #[schema(value_type = Option<String>, example = "15:30")]
    pub horario: Option<NaiveTime>,

    pub status: Option<AppointmentStatus>,
}

/// Estado do espelho no Google Calendar após a operação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSyncStatus {
    Sincronizado,
    Desativado,
    Falhou,
    // Evento apagado direto no Google; a referência local foi limpa
    RemovidoNoGoogle,
    ReconexaoNecessaria,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduledServiceResponse {
    #[serde(flatten)]
    pub servico: ScheduledService,
    pub sincronizacao_google: CalendarSyncStatus,
}
