// src/db/scheduled_service_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, FromRow, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::scheduled_service::{AppointmentStatus, ScheduledService},
};

// Sempre com o nome do cliente, vindo de `clientes`
const SELECT_WITH_CLIENT: &str = r#"
    SELECT
        s.id, s.usuario_id, s.cliente_id, c.nome AS nome_cliente,
        s.titulo, s.descricao, s.data, s.horario, s.status,
        s.google_calendar_event_id, s.created_at, s.updated_at
    FROM servicos_agendados s
    LEFT JOIN clientes c ON c.id = s.cliente_id
"#;

/// Linha crua, sem JOIN, usada dentro das transações.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledServiceRow {
    pub id: i32,
    pub cliente_id: i32,
    pub titulo: String,
    pub descricao: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub status: AppointmentStatus,
    pub google_calendar_event_id: Option<String>,
}

/// Valores finais de um agendamento (criação ou edição já mesclada).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledServiceValues {
    pub cliente_id: i32,
    pub titulo: String,
    pub descricao: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub status: AppointmentStatus,
}

#[derive(Clone)]
pub struct ScheduledServiceRepository {
    pool: PgPool,
}

impl ScheduledServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, usuario_id: i32, values: &ScheduledServiceValues) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO servicos_agendados (usuario_id, cliente_id, titulo, descricao, data, horario, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(usuario_id)
        .bind(values.cliente_id)
        .bind(&values.titulo)
        .bind(values.descricao.as_deref())
        .bind(values.data)
        .bind(values.horario)
        .bind(values.status)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Trava a linha do prestador até o fim da transação.
    pub async fn lock_owned<'e, E>(&self, executor: E, id: i32, usuario_id: i32) -> Result<Option<ScheduledServiceRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ScheduledServiceRow>(
            r#"
            SELECT id, cliente_id, titulo, descricao, data, horario, status, google_calendar_event_id
            FROM servicos_agendados
            WHERE id = $1 AND usuario_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn update<'e, E>(&self, executor: E, id: i32, values: &ScheduledServiceValues) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE servicos_agendados SET
                cliente_id = $2, titulo = $3, descricao = $4,
                data = $5, horario = $6, status = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(values.cliente_id)
        .bind(&values.titulo)
        .bind(values.descricao.as_deref())
        .bind(values.data)
        .bind(values.horario)
        .bind(values.status)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM servicos_agendados WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Ids de evento dos agendamentos de um cliente, travando as linhas.
    pub async fn event_ids_for_client<'e, E>(&self, executor: E, cliente_id: i32, usuario_id: i32) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT google_calendar_event_id FROM servicos_agendados
            WHERE cliente_id = $1 AND usuario_id = $2 AND google_calendar_event_id IS NOT NULL
            FOR UPDATE
            "#,
        )
        .bind(cliente_id)
        .bind(usuario_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn event_ids_for_user(&self, usuario_id: i32) -> Result<Vec<String>, AppError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT google_calendar_event_id FROM servicos_agendados WHERE usuario_id = $1 AND google_calendar_event_id IS NOT NULL",
        )
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Grava (ou limpa) a referência ao evento do Google, fora da transação.
    pub async fn set_event_id(&self, id: i32, event_id: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE servicos_agendados SET google_calendar_event_id = $2 WHERE id = $1")
            .bind(id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find(&self, id: i32, usuario_id: i32) -> Result<Option<ScheduledService>, AppError> {
        let service = sqlx::query_as::<_, ScheduledService>(&format!(
            "{} WHERE s.id = $1 AND s.usuario_id = $2",
            SELECT_WITH_CLIENT
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    pub async fn list(&self, usuario_id: i32) -> Result<Vec<ScheduledService>, AppError> {
        let services = sqlx::query_as::<_, ScheduledService>(&format!(
            "{} WHERE s.usuario_id = $1 ORDER BY s.data ASC, s.horario ASC",
            SELECT_WITH_CLIENT
        ))
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }
}
