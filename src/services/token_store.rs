// src/services/token_store.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::ConfigRepository,
    services::google::IssuedTokens,
};

/// Estado OAuth do Google de um prestador.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoogleCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub integration_enabled: bool,
}

/// Onde os tokens do Google ficam guardados. Toda operação relê o estado;
/// não existe cache em memória no caminho de produção.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, usuario_id: i32) -> Result<Option<GoogleCredentials>, AppError>;

    /// Persiste tokens recém-emitidos. `refresh_token = None` preserva o atual.
    async fn set(&self, usuario_id: i32, tokens: &IssuedTokens) -> Result<(), AppError>;

    /// Apaga todos os tokens e desliga a integração, atomicamente.
    async fn clear(&self, usuario_id: i32) -> Result<(), AppError>;

    async fn set_enabled(&self, usuario_id: i32, enabled: bool) -> Result<(), AppError>;
}

// --- Implementação em Postgres (tabela `configuracoes`) ---

#[derive(Clone)]
pub struct PgTokenStore {
    repo: ConfigRepository,
}

impl PgTokenStore {
    pub fn new(repo: ConfigRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn get(&self, usuario_id: i32) -> Result<Option<GoogleCredentials>, AppError> {
        let row = self.repo.find(usuario_id).await?;
        Ok(row.map(|r| GoogleCredentials {
            access_token: r.google_access_token,
            refresh_token: r.google_refresh_token,
            expiry: r.google_token_expiry,
            integration_enabled: r.google_calendar_ativo,
        }))
    }

    async fn set(&self, usuario_id: i32, tokens: &IssuedTokens) -> Result<(), AppError> {
        self.repo
            .save_google_tokens(
                usuario_id,
                &tokens.access_token,
                tokens.refresh_token.as_deref(),
                tokens.expiry,
            )
            .await
    }

    async fn clear(&self, usuario_id: i32) -> Result<(), AppError> {
        self.repo.clear_google_tokens(usuario_id).await
    }

    async fn set_enabled(&self, usuario_id: i32, enabled: bool) -> Result<(), AppError> {
        self.repo.set_google_enabled(usuario_id, enabled).await
    }
}

// --- Implementação em memória (testes e ferramentas locais) ---

#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: Mutex<HashMap<i32, GoogleCredentials>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(usuario_id: i32, credentials: GoogleCredentials) -> Self {
        let store = Self::default();
        store.lock().insert(usuario_id, credentials);
        store
    }

    pub fn snapshot(&self, usuario_id: i32) -> Option<GoogleCredentials> {
        self.lock().get(&usuario_id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i32, GoogleCredentials>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, usuario_id: i32) -> Result<Option<GoogleCredentials>, AppError> {
        Ok(self.snapshot(usuario_id))
    }

    async fn set(&self, usuario_id: i32, tokens: &IssuedTokens) -> Result<(), AppError> {
        let mut entries = self.lock();
        let entry = entries.entry(usuario_id).or_default();
        entry.access_token = Some(tokens.access_token.clone());
        entry.expiry = Some(tokens.expiry);
        if let Some(refresh) = &tokens.refresh_token {
            entry.refresh_token = Some(refresh.clone());
        }
        Ok(())
    }

    async fn clear(&self, usuario_id: i32) -> Result<(), AppError> {
        if let Some(entry) = self.lock().get_mut(&usuario_id) {
            *entry = GoogleCredentials::default();
        }
        Ok(())
    }

    async fn set_enabled(&self, usuario_id: i32, enabled: bool) -> Result<(), AppError> {
        self.lock().entry(usuario_id).or_default().integration_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tokens(access: &str, refresh: Option<&str>) -> IssuedTokens {
        IssuedTokens {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expiry: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn keeps_refresh_token_when_google_does_not_rotate_it() {
        let store = InMemoryTokenStore::new();
        store.set(7, &tokens("a1", Some("r1"))).await.unwrap();
        store.set(7, &tokens("a2", None)).await.unwrap();

        let saved = store.snapshot(7).unwrap();
        assert_eq!(saved.access_token.as_deref(), Some("a2"));
        assert_eq!(saved.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn clear_wipes_tokens_and_disables_integration() {
        let store = InMemoryTokenStore::new();
        store.set(7, &tokens("a1", Some("r1"))).await.unwrap();
        store.set_enabled(7, true).await.unwrap();

        store.clear(7).await.unwrap();

        assert_eq!(store.snapshot(7), Some(GoogleCredentials::default()));
    }
}
