// src/db/transaction_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::transaction::{Transaction, TransactionFilter, TransactionKind, TransactionPayload, TransactionSummary},
};

const TRANSACTION_COLUMNS: &str = "id, usuario_id, tipo, descricao, valor, data, categoria, created_at";

// Filtros opcionais: `$n IS NULL OR ...` evita montar SQL dinâmico
const FILTER_CLAUSE: &str = "usuario_id = $1 \
    AND ($2::tipo_transacao IS NULL OR tipo = $2) \
    AND ($3::date IS NULL OR data >= $3) \
    AND ($4::date IS NULL OR data <= $4)";

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, usuario_id: i32, payload: &TransactionPayload) -> Result<Transaction, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transacoes_financeiras (usuario_id, tipo, descricao, valor, data, categoria)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(usuario_id)
        .bind(payload.tipo)
        .bind(payload.descricao.as_deref())
        .bind(payload.valor)
        .bind(payload.data)
        .bind(payload.categoria.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(transaction)
    }

    pub async fn list(&self, usuario_id: i32, filter: &TransactionFilter) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transacoes_financeiras WHERE {} ORDER BY data DESC, id DESC",
            TRANSACTION_COLUMNS, FILTER_CLAUSE
        ))
        .bind(usuario_id)
        .bind(filter.tipo)
        .bind(filter.inicio)
        .bind(filter.fim)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    /// Totais do período; o filtro de `tipo` é ignorado aqui.
    pub async fn summary(&self, usuario_id: i32, filter: &TransactionFilter) -> Result<TransactionSummary, AppError> {
        let summary = sqlx::query_as::<_, TransactionSummary>(&format!(
            r#"
            SELECT
                COALESCE(SUM(valor) FILTER (WHERE tipo = 'Entrada'), 0) AS total_entradas,
                COALESCE(SUM(valor) FILTER (WHERE tipo = 'Saída'), 0) AS total_saidas,
                COALESCE(SUM(CASE WHEN tipo = 'Entrada' THEN valor ELSE -valor END), 0) AS saldo
            FROM transacoes_financeiras
            WHERE {}
            "#,
            FILTER_CLAUSE
        ))
        .bind(usuario_id)
        .bind(None::<TransactionKind>)
        .bind(filter.inicio)
        .bind(filter.fim)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    pub async fn find(&self, id: i32, usuario_id: i32) -> Result<Option<Transaction>, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transacoes_financeiras WHERE id = $1 AND usuario_id = $2",
            TRANSACTION_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    pub async fn update(
        &self,
        id: i32,
        usuario_id: i32,
        payload: &TransactionPayload,
    ) -> Result<Option<Transaction>, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transacoes_financeiras SET
                tipo = $3, descricao = $4, valor = $5, data = $6, categoria = $7
            WHERE id = $1 AND usuario_id = $2
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .bind(payload.tipo)
        .bind(payload.descricao.as_deref())
        .bind(payload.valor)
        .bind(payload.data)
        .bind(payload.categoria.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    pub async fn delete(&self, id: i32, usuario_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM transacoes_financeiras WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(usuario_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
