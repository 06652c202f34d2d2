// src/services/calendar_sync.rs
//
// Espelho best-effort dos agendamentos no Google Calendar do prestador.
// O registro local é sempre a fonte da verdade: nenhuma falha aqui desfaz
// uma escrita no banco.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    common::error::AppError,
    models::scheduled_service::CalendarSyncStatus,
    services::{
        google::{CalendarEvent, GoogleApi, GoogleError},
        token_store::TokenStore,
    },
};

/// Antecedência mínima de validade do access token antes de cada uso.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Credencial pronta para uso numa sequência de chamadas.
#[derive(Debug, Clone)]
pub struct Session {
    usuario_id: i32,
    access_token: String,
    refresh_token: String,
}

#[derive(Debug)]
pub enum Authorization {
    /// Integração desligada ou sem refresh token: o espelho é pulado.
    NotConnected,
    Connected(Session),
}

/// O que fazer com o `google_calendar_event_id` guardado localmente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventIdChange {
    Keep,
    Set(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub event_id: EventIdChange,
    pub status: CalendarSyncStatus,
}

impl SyncOutcome {
    fn unchanged(status: CalendarSyncStatus) -> Self {
        Self { event_id: EventIdChange::Keep, status }
    }
}

/// Resultado de uma atualização remota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUpdate {
    Updated,
    /// O evento sumiu do Google (404/410): o id local deve ser limpo.
    Deleted,
    Failed,
}

enum Call<'a> {
    Insert(&'a CalendarEvent),
    Update(&'a str, &'a CalendarEvent),
    Delete(&'a str),
}

pub fn needs_refresh(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expiry {
        Some(expiry) => expiry - now < Duration::seconds(REFRESH_MARGIN_SECS),
        None => true,
    }
}

#[derive(Clone)]
pub struct CalendarSync {
    store: Arc<dyn TokenStore>,
    google: Arc<dyn GoogleApi>,
}

impl CalendarSync {
    pub fn new(store: Arc<dyn TokenStore>, google: Arc<dyn GoogleApi>) -> Self {
        Self { store, google }
    }

    // =========================================================================
    //  CONEXÃO (OAuth)
    // =========================================================================

    /// Troca o código de autorização do app por tokens e liga a integração.
    pub async fn connect(&self, usuario_id: i32, code: &str, redirect_uri: &str) -> Result<(), AppError> {
        let tokens = self.google
            .exchange_code(code, redirect_uri)
            .await
            .map_err(|e| match e {
                GoogleError::GrantRejected(detail) => {
                    tracing::warn!("Código OAuth recusado para o usuário {}: {}", usuario_id, detail);
                    AppError::BadRequest("Código de autorização do Google inválido ou expirado.".into())
                }
                other => other.into(),
            })?;

        if tokens.refresh_token.is_none() {
            return Err(AppError::BadRequest(
                "O Google não devolveu um refresh token. Remova o acesso do app na sua conta Google e conecte novamente.".into(),
            ));
        }

        self.store.set(usuario_id, &tokens).await?;
        self.store.set_enabled(usuario_id, true).await?;

        tracing::info!("📅 Google Calendar conectado para o usuário {}", usuario_id);
        Ok(())
    }

    pub async fn disconnect(&self, usuario_id: i32) -> Result<(), AppError> {
        self.store.clear(usuario_id).await?;
        tracing::info!("Google Calendar desconectado para o usuário {}", usuario_id);
        Ok(())
    }

    /// Carrega os tokens do usuário e garante um access token válido por
    /// pelo menos mais `REFRESH_MARGIN_SECS`.
    pub async fn authorize(&self, usuario_id: i32) -> Result<Authorization, AppError> {
        let Some(credentials) = self.store.get(usuario_id).await? else {
            return Ok(Authorization::NotConnected);
        };
        if !credentials.integration_enabled {
            return Ok(Authorization::NotConnected);
        }
        let Some(refresh_token) = credentials.refresh_token else {
            return Ok(Authorization::NotConnected);
        };

        let mut session = Session {
            usuario_id,
            access_token: credentials.access_token.unwrap_or_default(),
            refresh_token,
        };

        if session.access_token.is_empty() || needs_refresh(credentials.expiry, Utc::now()) {
            self.refresh(&mut session).await?;
        }

        Ok(Authorization::Connected(session))
    }

    /// Renova o access token e persiste o resultado. Refresh recusado pelo
    /// Google desliga a integração e exige nova conexão.
    async fn refresh(&self, session: &mut Session) -> Result<(), AppError> {
        match self.google.refresh(&session.refresh_token).await {
            Ok(tokens) => {
                self.store.set(session.usuario_id, &tokens).await?;

                session.access_token = tokens.access_token;
                if let Some(rotated) = tokens.refresh_token {
                    session.refresh_token = rotated;
                }
                tracing::debug!("Access token do Google renovado para o usuário {}", session.usuario_id);
                Ok(())
            }
            Err(GoogleError::GrantRejected(detail)) => {
                tracing::warn!(
                    "🔒 Refresh token do usuário {} rejeitado ({}); integração desativada",
                    session.usuario_id,
                    detail
                );
                self.store.clear(session.usuario_id).await?;
                Err(AppError::GoogleReconnectRequired)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn execute(&self, access_token: &str, call: &Call<'_>) -> Result<Option<String>, GoogleError> {
        match call {
            Call::Insert(event) => self.google.insert_event(access_token, event).await.map(Some),
            Call::Update(id, event) => self.google.update_event(access_token, id, event).await.map(|_| None),
            Call::Delete(id) => self.google.delete_event(access_token, id).await.map(|_| None),
        }
    }

    /// Executa a chamada; um 401 provoca um refresh e uma única nova tentativa.
    async fn call(&self, session: &mut Session, call: Call<'_>) -> Result<Option<String>, AppError> {
        match self.execute(&session.access_token, &call).await {
            Err(GoogleError::Unauthorized) => {
                self.refresh(session).await?;
                Ok(self.execute(&session.access_token, &call).await?)
            }
            other => Ok(other?),
        }
    }

    // =========================================================================
    //  OPERAÇÕES NO EVENTO REMOTO
    // =========================================================================

    /// Cria o evento e devolve o id remoto; `None` em qualquer falha.
    pub async fn create_event(&self, session: &mut Session, event: &CalendarEvent) -> Option<String> {
        match self.call(session, Call::Insert(event)).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Falha ao criar evento no Google para o usuário {}: {}", session.usuario_id, e);
                None
            }
        }
    }

    pub async fn update_event(&self, session: &mut Session, event_id: &str, event: &CalendarEvent) -> RemoteUpdate {
        match self.call(session, Call::Update(event_id, event)).await {
            Ok(_) => RemoteUpdate::Updated,
            Err(AppError::Google(GoogleError::EventGone)) => {
                tracing::info!("Evento {} foi removido no Google; limpando referência local", event_id);
                RemoteUpdate::Deleted
            }
            Err(e) => {
                tracing::warn!("Falha ao atualizar evento {} no Google: {}", event_id, e);
                RemoteUpdate::Failed
            }
        }
    }

    /// Remoção best-effort; evento inexistente conta como removido.
    pub async fn delete_event(&self, session: &mut Session, event_id: &str) -> bool {
        match self.call(session, Call::Delete(event_id)).await {
            Ok(_) | Err(AppError::Google(GoogleError::EventGone)) => true,
            Err(e) => {
                tracing::warn!("Falha ao remover evento {} do Google: {}", event_id, e);
                false
            }
        }
    }

    // =========================================================================
    //  ORQUESTRAÇÃO (chamada depois da escrita local)
    // =========================================================================

    async fn session_for(&self, usuario_id: i32) -> Result<Option<Session>, CalendarSyncStatus> {
        match self.authorize(usuario_id).await {
            Ok(Authorization::Connected(session)) => Ok(Some(session)),
            Ok(Authorization::NotConnected) => Ok(None),
            Err(AppError::GoogleReconnectRequired) => Err(CalendarSyncStatus::ReconexaoNecessaria),
            Err(e) => {
                tracing::warn!("Não foi possível autorizar o Google para o usuário {}: {}", usuario_id, e);
                Err(CalendarSyncStatus::Falhou)
            }
        }
    }

    async fn create_with_session(&self, session: &mut Session, event: &CalendarEvent) -> SyncOutcome {
        match self.create_event(session, event).await {
            Some(id) => SyncOutcome { event_id: EventIdChange::Set(id), status: CalendarSyncStatus::Sincronizado },
            None => SyncOutcome::unchanged(CalendarSyncStatus::Falhou),
        }
    }

    pub async fn sync_created(&self, usuario_id: i32, event: &CalendarEvent) -> SyncOutcome {
        match self.session_for(usuario_id).await {
            Ok(Some(mut session)) => self.create_with_session(&mut session, event).await,
            Ok(None) => SyncOutcome::unchanged(CalendarSyncStatus::Desativado),
            Err(status) => SyncOutcome::unchanged(status),
        }
    }

    pub async fn sync_updated(
        &self,
        usuario_id: i32,
        current_event_id: Option<&str>,
        event: &CalendarEvent,
    ) -> SyncOutcome {
        let mut session = match self.session_for(usuario_id).await {
            Ok(Some(session)) => session,
            // Integração desligada: só esquecemos a referência, o evento remoto fica
            Ok(None) => {
                let event_id = match current_event_id {
                    Some(_) => EventIdChange::Clear,
                    None => EventIdChange::Keep,
                };
                return SyncOutcome { event_id, status: CalendarSyncStatus::Desativado };
            }
            Err(status) => return SyncOutcome::unchanged(status),
        };

        match current_event_id {
            Some(event_id) => match self.update_event(&mut session, event_id, event).await {
                RemoteUpdate::Updated => SyncOutcome::unchanged(CalendarSyncStatus::Sincronizado),
                RemoteUpdate::Deleted => SyncOutcome {
                    event_id: EventIdChange::Clear,
                    status: CalendarSyncStatus::RemovidoNoGoogle,
                },
                RemoteUpdate::Failed => SyncOutcome::unchanged(CalendarSyncStatus::Falhou),
            },
            None => self.create_with_session(&mut session, event).await,
        }
    }

    pub async fn sync_deleted(&self, usuario_id: i32, event_id: &str) -> CalendarSyncStatus {
        self.sync_deleted_all(usuario_id, &[event_id.to_string()]).await
    }

    /// Apaga vários eventos com uma única autorização (exclusão de cliente ou conta).
    pub async fn sync_deleted_all(&self, usuario_id: i32, event_ids: &[String]) -> CalendarSyncStatus {
        if event_ids.is_empty() {
            return CalendarSyncStatus::Desativado;
        }
        match self.session_for(usuario_id).await {
            Ok(Some(mut session)) => {
                let mut all_removed = true;
                for event_id in event_ids {
                    all_removed &= self.delete_event(&mut session, event_id).await;
                }
                if all_removed {
                    CalendarSyncStatus::Sincronizado
                } else {
                    CalendarSyncStatus::Falhou
                }
            }
            Ok(None) => CalendarSyncStatus::Desativado,
            Err(status) => status,
        }
    }
}
