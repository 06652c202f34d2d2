// src/db/config_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::config::ConfigRow};

const CONFIG_COLUMNS: &str = "usuario_id, notificacoes_ativas, google_calendar_ativo, \
    google_access_token, google_refresh_token, google_token_expiry, updated_at";

// Uma linha de `configuracoes` por prestador (1:1 com `usuarios`)
#[derive(Clone)]
pub struct ConfigRepository {
    pool: PgPool,
}

impl ConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria a configuração padrão (usado no cadastro, dentro da transação).
    pub async fn create_default<'e, E>(&self, executor: E, usuario_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO configuracoes (usuario_id) VALUES ($1) ON CONFLICT (usuario_id) DO NOTHING")
            .bind(usuario_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn find(&self, usuario_id: i32) -> Result<Option<ConfigRow>, AppError> {
        let row = sqlx::query_as::<_, ConfigRow>(&format!(
            "SELECT {} FROM configuracoes WHERE usuario_id = $1",
            CONFIG_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Busca a configuração, criando a padrão se o usuário ainda não tiver uma.
    pub async fn get_or_create(&self, usuario_id: i32) -> Result<ConfigRow, AppError> {
        // O DO UPDATE "vazio" garante que o RETURNING devolva a linha existente
        let row = sqlx::query_as::<_, ConfigRow>(&format!(
            r#"
            INSERT INTO configuracoes (usuario_id) VALUES ($1)
            ON CONFLICT (usuario_id) DO UPDATE SET usuario_id = EXCLUDED.usuario_id
            RETURNING {}
            "#,
            CONFIG_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(
        &self,
        usuario_id: i32,
        notificacoes_ativas: Option<bool>,
        google_calendar_ativo: Option<bool>,
    ) -> Result<ConfigRow, AppError> {
        let row = sqlx::query_as::<_, ConfigRow>(&format!(
            r#"
            INSERT INTO configuracoes (usuario_id, notificacoes_ativas, google_calendar_ativo)
            VALUES ($1, COALESCE($2, TRUE), COALESCE($3, FALSE))
            ON CONFLICT (usuario_id) DO UPDATE SET
                notificacoes_ativas = COALESCE($2, configuracoes.notificacoes_ativas),
                google_calendar_ativo = COALESCE($3, configuracoes.google_calendar_ativo),
                updated_at = NOW()
            RETURNING {}
            "#,
            CONFIG_COLUMNS
        ))
        .bind(usuario_id)
        .bind(notificacoes_ativas)
        .bind(google_calendar_ativo)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // =========================================================================
    //  TOKENS DO GOOGLE
    // =========================================================================

    /// Grava access token e validade; o refresh token só é trocado quando
    /// o Google emitiu um novo.
    pub async fn save_google_tokens(
        &self,
        usuario_id: i32,
        access_token: &str,
        refresh_token: Option<&str>,
        expiry: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO configuracoes (usuario_id, google_access_token, google_refresh_token, google_token_expiry)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (usuario_id) DO UPDATE SET
                google_access_token = EXCLUDED.google_access_token,
                google_refresh_token = COALESCE(EXCLUDED.google_refresh_token, configuracoes.google_refresh_token),
                google_token_expiry = EXCLUDED.google_token_expiry,
                updated_at = NOW()
            "#,
        )
        .bind(usuario_id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expiry)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Limpa os três tokens e desliga a integração num único UPDATE.
    pub async fn clear_google_tokens(&self, usuario_id: i32) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE configuracoes SET
                google_access_token = NULL,
                google_refresh_token = NULL,
                google_token_expiry = NULL,
                google_calendar_ativo = FALSE,
                updated_at = NOW()
            WHERE usuario_id = $1
            "#,
        )
        .bind(usuario_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_google_enabled(&self, usuario_id: i32, enabled: bool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO configuracoes (usuario_id, google_calendar_ativo) VALUES ($1, $2)
            ON CONFLICT (usuario_id) DO UPDATE SET google_calendar_ativo = $2, updated_at = NOW()
            "#,
        )
        .bind(usuario_id)
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
