// src/services/scheduling_service.rs
//
// Agendamentos: a escrita local acontece numa transação e só depois do
// commit o evento é espelhado no Google Calendar.

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        ClientRepository, ScheduledServiceRepository,
        scheduled_service_repo::{ScheduledServiceRow, ScheduledServiceValues},
    },
    models::scheduled_service::{
        CalendarSyncStatus, CreateScheduledServicePayload, ScheduledService, ScheduledServiceResponse,
        UpdateScheduledServicePayload,
    },
    services::{
        calendar_sync::{CalendarSync, EventIdChange, SyncOutcome},
        google::CalendarEvent,
    },
};

pub fn values_for_create(payload: &CreateScheduledServicePayload) -> Result<ScheduledServiceValues, AppError> {
    let missing = |campo: &str| AppError::BadRequest(format!("O campo '{}' é obrigatório.", campo));

    Ok(ScheduledServiceValues {
        cliente_id: payload.cliente_id.ok_or_else(|| missing("cliente_id"))?,
        titulo: payload.titulo.clone().ok_or_else(|| missing("titulo"))?,
        descricao: payload.descricao.clone(),
        data: payload.data.ok_or_else(|| missing("data"))?,
        horario: payload.horario.ok_or_else(|| missing("horario"))?,
        status: payload.status.unwrap_or_default(),
    })
}

/// PUT parcial: o que não veio no corpo mantém o valor atual.
pub fn merge_update(current: &ScheduledServiceRow, payload: &UpdateScheduledServicePayload) -> ScheduledServiceValues {
    ScheduledServiceValues {
        cliente_id: payload.cliente_id.unwrap_or(current.cliente_id),
        titulo: payload.titulo.clone().unwrap_or_else(|| current.titulo.clone()),
        descricao: payload.descricao.clone().or_else(|| current.descricao.clone()),
        data: payload.data.unwrap_or(current.data),
        horario: payload.horario.unwrap_or(current.horario),
        status: payload.status.unwrap_or(current.status),
    }
}

fn calendar_event(servico: &ScheduledService) -> CalendarEvent {
    CalendarEvent::for_appointment(
        &servico.titulo,
        servico.descricao.as_deref(),
        servico.nome_cliente.as_deref(),
        servico.data,
        servico.horario,
    )
}

#[derive(Clone)]
pub struct SchedulingService {
    pool: PgPool,
    repo: ScheduledServiceRepository,
    client_repo: ClientRepository,
    calendar: CalendarSync,
}

impl SchedulingService {
    pub fn new(
        pool: PgPool,
        repo: ScheduledServiceRepository,
        client_repo: ClientRepository,
        calendar: CalendarSync,
    ) -> Self {
        Self { pool, repo, client_repo, calendar }
    }

    pub async fn list(&self, usuario_id: i32) -> Result<Vec<ScheduledService>, AppError> {
        self.repo.list(usuario_id).await
    }

    pub async fn get(&self, usuario_id: i32, id: i32) -> Result<ScheduledService, AppError> {
        self.repo
            .find(id, usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Serviço agendado"))
    }

    pub async fn create(
        &self,
        usuario_id: i32,
        payload: &CreateScheduledServicePayload,
    ) -> Result<ScheduledServiceResponse, AppError> {
        let values = values_for_create(payload)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        if !self.client_repo.exists(&mut *tx, values.cliente_id, usuario_id).await? {
            return Err(AppError::Forbidden);
        }
        let id = self.repo.insert(&mut *tx, usuario_id, &values).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        let mut servico = self.get(usuario_id, id).await?;
        let outcome = self.calendar.sync_created(usuario_id, &calendar_event(&servico)).await;
        let status = self.apply(&mut servico, outcome).await;

        Ok(ScheduledServiceResponse { servico, sincronizacao_google: status })
    }

    pub async fn update(
        &self,
        usuario_id: i32,
        id: i32,
        payload: &UpdateScheduledServicePayload,
    ) -> Result<ScheduledServiceResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.repo
            .lock_owned(&mut *tx, id, usuario_id)
            .await?
            .ok_or(AppError::Forbidden)?;

        let values = merge_update(&current, payload);
        if values.cliente_id != current.cliente_id
            && !self.client_repo.exists(&mut *tx, values.cliente_id, usuario_id).await?
        {
            return Err(AppError::Forbidden);
        }
        self.repo.update(&mut *tx, id, &values).await?;

        tx.commit().await?;

        let mut servico = self.get(usuario_id, id).await?;
        let outcome = self.calendar
            .sync_updated(usuario_id, current.google_calendar_event_id.as_deref(), &calendar_event(&servico))
            .await;
        let status = self.apply(&mut servico, outcome).await;

        Ok(ScheduledServiceResponse { servico, sincronizacao_google: status })
    }

    /// Remove o agendamento; o evento remoto é apagado depois, sem garantia.
    pub async fn delete(&self, usuario_id: i32, id: i32) -> Result<CalendarSyncStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.repo
            .lock_owned(&mut *tx, id, usuario_id)
            .await?
            .ok_or(AppError::Forbidden)?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        let status = match current.google_calendar_event_id.as_deref() {
            Some(event_id) => self.calendar.sync_deleted(usuario_id, event_id).await,
            None => CalendarSyncStatus::Desativado,
        };
        Ok(status)
    }

    /// Remove o cliente e seus agendamentos; os eventos remotos vão depois do commit.
    pub async fn delete_client(&self, usuario_id: i32, cliente_id: i32) -> Result<CalendarSyncStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        let event_ids = self.repo.event_ids_for_client(&mut *tx, cliente_id, usuario_id).await?;
        if !self.client_repo.delete(&mut *tx, cliente_id, usuario_id).await? {
            return Err(AppError::Forbidden);
        }

        tx.commit().await?;

        Ok(self.calendar.sync_deleted_all(usuario_id, &event_ids).await)
    }

    /// Apaga no Google todos os eventos do usuário. Roda antes da exclusão
    /// da conta, enquanto os tokens ainda existem.
    pub async fn clear_remote_events(&self, usuario_id: i32) -> Result<CalendarSyncStatus, AppError> {
        let event_ids = self.repo.event_ids_for_user(usuario_id).await?;
        let status = self.calendar.sync_deleted_all(usuario_id, &event_ids).await;
        tracing::info!("{} evento(s) do usuário {} no Google: {:?}", event_ids.len(), usuario_id, status);
        Ok(status)
    }

    // Grava a mudança de referência pedida pela sincronização
    async fn apply(&self, servico: &mut ScheduledService, outcome: SyncOutcome) -> CalendarSyncStatus {
        let new_id = match outcome.event_id {
            EventIdChange::Keep => return outcome.status,
            EventIdChange::Set(event_id) => Some(event_id),
            EventIdChange::Clear => None,
        };

        match self.repo.set_event_id(servico.id, new_id.as_deref()).await {
            Ok(()) => {
                servico.google_calendar_event_id = new_id;
                outcome.status
            }
            Err(e) => {
                tracing::warn!("Falha ao gravar o id do evento do serviço {}: {}", servico.id, e);
                CalendarSyncStatus::Falhou
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, NaiveTime, Utc};

    use crate::{
        models::scheduled_service::AppointmentStatus,
        services::{
            google::{GoogleError, MockGoogleApi},
            token_store::{GoogleCredentials, InMemoryTokenStore},
        },
    };

    fn row() -> ScheduledServiceRow {
        ScheduledServiceRow {
            id: 10,
            cliente_id: 1,
            titulo: "Reunião".into(),
            descricao: Some("Pauta".into()),
            data: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            horario: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            status: AppointmentStatus::Agendado,
            google_calendar_event_id: Some("evt-1".into()),
        }
    }

    #[test]
    fn partial_update_keeps_missing_fields() {
        let payload = UpdateScheduledServicePayload {
            horario: NaiveTime::from_hms_opt(15, 30, 0),
            status: Some(AppointmentStatus::Concluido),
            ..Default::default()
        };

        let merged = merge_update(&row(), &payload);

        assert_eq!(merged.titulo, "Reunião");
        assert_eq!(merged.descricao.as_deref(), Some("Pauta"));
        assert_eq!(merged.cliente_id, 1);
        assert_eq!(merged.horario, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(merged.status, AppointmentStatus::Concluido);
    }

    #[test]
    fn create_defaults_status_to_agendado() {
        let payload: CreateScheduledServicePayload = serde_json::from_value(serde_json::json!({
            "cliente_id": 1,
            "titulo": "Reunião",
            "data": "2024-06-01",
            "horario": "14:00"
        }))
        .unwrap();

        let values = values_for_create(&payload).unwrap();

        assert_eq!(values.status, AppointmentStatus::Agendado);
        assert_eq!(values.horario, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    // --- Fluxo completo contra o banco (precisa de DATABASE_URL) ---

    async fn seed(pool: &PgPool) -> (i32, i32) {
        let usuario_id: i32 = sqlx::query_scalar(
            "INSERT INTO usuarios (nome, email, senha_hash) VALUES ('Ana', 'ana@teste.com', 'x') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let cliente_id: i32 = sqlx::query_scalar(
            "INSERT INTO clientes (usuario_id, nome) VALUES ($1, 'Maria') RETURNING id",
        )
        .bind(usuario_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (usuario_id, cliente_id)
    }

    fn scheduling(pool: PgPool, store: Arc<InMemoryTokenStore>, google: MockGoogleApi) -> SchedulingService {
        SchedulingService::new(
            pool.clone(),
            ScheduledServiceRepository::new(pool.clone()),
            ClientRepository::new(pool),
            CalendarSync::new(store, Arc::new(google)),
        )
    }

    fn connected() -> GoogleCredentials {
        GoogleCredentials {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            expiry: Some(Utc::now() + Duration::hours(1)),
            integration_enabled: true,
        }
    }

    fn payload(cliente_id: i32) -> CreateScheduledServicePayload {
        serde_json::from_value(serde_json::json!({
            "cliente_id": cliente_id,
            "titulo": "Reunião",
            "data": "2024-06-01",
            "horario": "14:00"
        }))
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn created_appointment_keeps_the_remote_event_id(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let store = Arc::new(InMemoryTokenStore::with(usuario_id, connected()));
        let mut google = MockGoogleApi::new();
        google.expect_insert_event().times(1).returning(|_, _| Ok("evt-123".to_string()));

        let service = scheduling(pool, store, google);
        let created = service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        assert_eq!(created.sincronizacao_google, CalendarSyncStatus::Sincronizado);
        assert_eq!(created.servico.google_calendar_event_id.as_deref(), Some("evt-123"));

        let fetched = service.get(usuario_id, created.servico.id).await.unwrap();
        assert_eq!(fetched.google_calendar_event_id.as_deref(), Some("evt-123"));
        assert_eq!(fetched.nome_cliente.as_deref(), Some("Maria"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn disabled_integration_leaves_event_id_null(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let service = scheduling(pool, Arc::new(InMemoryTokenStore::new()), MockGoogleApi::new());

        let created = service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        assert_eq!(created.sincronizacao_google, CalendarSyncStatus::Desativado);
        assert_eq!(created.servico.google_calendar_event_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn delete_removes_the_row_even_if_google_fails(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let store = Arc::new(InMemoryTokenStore::with(usuario_id, connected()));
        let mut google = MockGoogleApi::new();
        google.expect_insert_event().returning(|_, _| Ok("evt-9".to_string()));
        google
            .expect_delete_event()
            .returning(|_, _| Err(GoogleError::Api { status: 500, body: String::new() }));

        let service = scheduling(pool, store, google);
        let created = service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        let status = service.delete(usuario_id, created.servico.id).await.unwrap();

        assert_eq!(status, CalendarSyncStatus::Falhou);
        assert!(matches!(service.get(usuario_id, created.servico.id).await, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn other_users_cannot_touch_the_appointment(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let intruso: i32 = sqlx::query_scalar(
            "INSERT INTO usuarios (nome, email, senha_hash) VALUES ('Beto', 'beto@teste.com', 'x') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let service = scheduling(pool, Arc::new(InMemoryTokenStore::new()), MockGoogleApi::new());
        let created = service.create(usuario_id, &payload(cliente_id)).await.unwrap();
        let id = created.servico.id;

        assert!(matches!(service.get(intruso, id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(intruso, id, &UpdateScheduledServicePayload::default()).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(service.delete(intruso, id).await, Err(AppError::Forbidden)));
        // Nem usando o cliente de outro prestador
        assert!(matches!(service.create(intruso, &payload(cliente_id)).await, Err(AppError::Forbidden)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn update_after_remote_deletion_forgets_the_event_id(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let store = Arc::new(InMemoryTokenStore::with(usuario_id, connected()));
        let mut google = MockGoogleApi::new();
        google.expect_insert_event().times(1).returning(|_, _| Ok("evt-1".to_string()));
        google
            .expect_update_event()
            .withf(|_, id, _| id.to_string() == "evt-1")
            .times(1)
            .returning(|_, _, _| Err(GoogleError::EventGone));

        let service = scheduling(pool, store, google);
        let created = service.create(usuario_id, &payload(cliente_id)).await.unwrap();
        let id = created.servico.id;

        let changes = UpdateScheduledServicePayload { titulo: Some("Reunião remarcada".into()), ..Default::default() };
        let updated = service.update(usuario_id, id, &changes).await.unwrap();

        assert_eq!(updated.sincronizacao_google, CalendarSyncStatus::RemovidoNoGoogle);
        assert_eq!(updated.servico.google_calendar_event_id, None);

        let stored = service.get(usuario_id, id).await.unwrap();
        assert_eq!(stored.google_calendar_event_id, None);
        assert_eq!(stored.titulo, "Reunião remarcada");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn deleting_a_client_removes_its_events_from_google(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let store = Arc::new(InMemoryTokenStore::with(usuario_id, connected()));
        let mut google = MockGoogleApi::new();
        let mut next = 0;
        google.expect_insert_event().times(2).returning(move |_, _| {
            next += 1;
            Ok(format!("evt-{}", next))
        });
        google
            .expect_delete_event()
            .withf(|_, id| id.starts_with("evt-"))
            .times(2)
            .returning(|_, _| Ok(()));

        let service = scheduling(pool.clone(), store, google);
        service.create(usuario_id, &payload(cliente_id)).await.unwrap();
        service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        let status = service.delete_client(usuario_id, cliente_id).await.unwrap();

        assert_eq!(status, CalendarSyncStatus::Sincronizado);
        assert!(service.list(usuario_id).await.unwrap().is_empty());
        let restantes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clientes WHERE id = $1")
            .bind(cliente_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(restantes, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn another_users_client_is_left_alone(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let intruso: i32 = sqlx::query_scalar(
            "INSERT INTO usuarios (nome, email, senha_hash) VALUES ('Beto', 'beto@teste.com', 'x') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let mut google = MockGoogleApi::new();
        google.expect_delete_event().never();

        let service = scheduling(pool, Arc::new(InMemoryTokenStore::new()), google);
        service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        assert!(matches!(service.delete_client(intruso, cliente_id).await, Err(AppError::Forbidden)));
        assert_eq!(service.list(usuario_id).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn account_cleanup_deletes_every_remote_event(pool: PgPool) {
        let (usuario_id, cliente_id) = seed(&pool).await;
        let store = Arc::new(InMemoryTokenStore::with(usuario_id, connected()));
        let mut google = MockGoogleApi::new();
        google.expect_insert_event().times(1).returning(|_, _| Ok("evt-conta".to_string()));
        google
            .expect_delete_event()
            .withf(|_, id| id.to_string() == "evt-conta")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = scheduling(pool, store, google);
        service.create(usuario_id, &payload(cliente_id)).await.unwrap();

        let status = service.clear_remote_events(usuario_id).await.unwrap();

        assert_eq!(status, CalendarSyncStatus::Sincronizado);
    }
}
