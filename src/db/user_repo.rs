// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::auth::{UpdateUserPayload, User},
};

const USER_COLUMNS: &str = "id, nome, email, senha_hash, telefone, cnpj, razao_social, \
    inscricao_municipal, codigo_municipio, expo_push_token, reset_token_hash, \
    reset_token_expira_em, reset_tentativas, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// E-mails são guardados aparados e em minúsculas.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn map_unique_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some("usuarios_email_lower_key") {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM usuarios WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Cria o usuário dentro da transação do cadastro; e-mail duplicado vira 409
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        nome: &str,
        email: &str,
        senha_hash: &str,
        telefone: Option<&str>,
        cnpj: Option<&str>,
        razao_social: Option<&str>,
        inscricao_municipal: Option<&str>,
        codigo_municipio: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO usuarios (
                nome, email, senha_hash, telefone,
                cnpj, razao_social, inscricao_municipal, codigo_municipio
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(nome)
        .bind(email)
        .bind(senha_hash)
        .bind(telefone)
        .bind(cnpj)
        .bind(razao_social)
        .bind(inscricao_municipal)
        .bind(codigo_municipio)
        .fetch_one(executor)
        .await
        .map_err(map_unique_email)?;

        Ok(user)
    }

    pub async fn update_profile(&self, id: i32, payload: &UpdateUserPayload) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE usuarios SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                telefone = COALESCE($4, telefone),
                cnpj = COALESCE($5, cnpj),
                razao_social = COALESCE($6, razao_social),
                inscricao_municipal = COALESCE($7, inscricao_municipal),
                codigo_municipio = COALESCE($8, codigo_municipio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(payload.nome.as_deref())
        .bind(payload.email.as_deref().map(normalize_email))
        .bind(payload.telefone.as_deref())
        .bind(payload.cnpj.as_deref())
        .bind(payload.razao_social.as_deref())
        .bind(payload.inscricao_municipal.as_deref())
        .bind(payload.codigo_municipio.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)?
        .ok_or_else(|| AppError::not_found("Usuário"))?;

        Ok(user)
    }

    pub async fn set_push_token(&self, id: i32, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET expo_push_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a conta; as chaves estrangeiras apagam todos os dados do prestador.
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  RECUPERAÇÃO DE SENHA
    // =========================================================================

    pub async fn save_reset_code(
        &self,
        id: i32,
        code_hash: &str,
        expira_em: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE usuarios SET reset_token_hash = $2, reset_token_expira_em = $3, reset_tentativas = 0
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code_hash)
        .bind(expira_em)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Conta um código errado; ao chegar em `max` o código em vigor é descartado.
    pub async fn register_failed_reset(&self, id: i32, max: i32) -> Result<i32, AppError> {
        let tentativas: i32 = sqlx::query_scalar(
            r#"
            UPDATE usuarios SET
                reset_tentativas = reset_tentativas + 1,
                reset_token_hash = CASE WHEN reset_tentativas + 1 >= $2 THEN NULL ELSE reset_token_hash END,
                reset_token_expira_em = CASE WHEN reset_tentativas + 1 >= $2 THEN NULL ELSE reset_token_expira_em END
            WHERE id = $1
            RETURNING reset_tentativas
            "#,
        )
        .bind(id)
        .bind(max)
        .fetch_one(&self.pool)
        .await?;
        Ok(tentativas)
    }

    /// Troca a senha e invalida o código usado.
    pub async fn update_password(&self, id: i32, senha_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE usuarios SET
                senha_hash = $2,
                reset_token_hash = NULL,
                reset_token_expira_em = NULL,
                reset_tentativas = 0,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(senha_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
