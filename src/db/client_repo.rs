// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::client::{Client, ClientPayload},
};

const CLIENT_COLUMNS: &str = "id, usuario_id, nome, email, telefone, cpf_cnpj, endereco, numero, \
    bairro, cidade, uf, cep, observacoes, created_at, updated_at";

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, usuario_id: i32, payload: &ClientPayload) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clientes (
                usuario_id, nome, email, telefone, cpf_cnpj,
                endereco, numero, bairro, cidade, uf, cep, observacoes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(usuario_id)
        .bind(payload.nome.as_deref().unwrap_or_default())
        .bind(payload.email.as_deref())
        .bind(payload.telefone.as_deref())
        .bind(payload.cpf_cnpj.as_deref())
        .bind(payload.endereco.as_deref())
        .bind(payload.numero.as_deref())
        .bind(payload.bairro.as_deref())
        .bind(payload.cidade.as_deref())
        .bind(payload.uf.as_deref())
        .bind(payload.cep.as_deref())
        .bind(payload.observacoes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn list(&self, usuario_id: i32) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clientes WHERE usuario_id = $1 ORDER BY nome ASC",
            CLIENT_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    /// Busca por `(id, usuario_id)`: linha de outro prestador é tratada como inexistente.
    pub async fn find<'e, E>(&self, executor: E, id: i32, usuario_id: i32) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clientes WHERE id = $1 AND usuario_id = $2",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: i32, usuario_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM clientes WHERE id = $1 AND usuario_id = $2)",
        )
        .bind(id)
        .bind(usuario_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn update(&self, id: i32, usuario_id: i32, payload: &ClientPayload) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clientes SET
                nome = $3, email = $4, telefone = $5, cpf_cnpj = $6,
                endereco = $7, numero = $8, bairro = $9, cidade = $10,
                uf = $11, cep = $12, observacoes = $13,
                updated_at = NOW()
            WHERE id = $1 AND usuario_id = $2
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .bind(payload.nome.as_deref().unwrap_or_default())
        .bind(payload.email.as_deref())
        .bind(payload.telefone.as_deref())
        .bind(payload.cpf_cnpj.as_deref())
        .bind(payload.endereco.as_deref())
        .bind(payload.numero.as_deref())
        .bind(payload.bairro.as_deref())
        .bind(payload.cidade.as_deref())
        .bind(payload.uf.as_deref())
        .bind(payload.cep.as_deref())
        .bind(payload.observacoes.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Os agendamentos do cliente caem junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: i32, usuario_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(usuario_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
