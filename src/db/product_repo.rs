// src/db/product_repo.rs

use sqlx::{FromRow, PgPool};

use crate::{
    common::error::AppError,
    models::product::{Product, ProductPayload},
};

const PRODUCT_COLUMNS: &str = "id, usuario_id, nome, descricao, quantidade, quantidade_minima, \
    preco_custo, preco_venda, created_at, updated_at";

/// Produto em falta já cruzado com o dono, para o disparo de push.
#[derive(Debug, Clone, FromRow)]
pub struct LowStockRow {
    pub usuario_id: i32,
    pub expo_push_token: Option<String>,
    pub notificacoes_ativas: bool,
    pub nome: String,
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, usuario_id: i32, payload: &ProductPayload) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO produtos (usuario_id, nome, descricao, quantidade, quantidade_minima, preco_custo, preco_venda)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(usuario_id)
        .bind(payload.nome.as_deref().unwrap_or_default())
        .bind(payload.descricao.as_deref())
        .bind(payload.quantidade.unwrap_or_default())
        .bind(payload.quantidade_minima)
        .bind(payload.preco_custo)
        .bind(payload.preco_venda)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn list(&self, usuario_id: i32) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM produtos WHERE usuario_id = $1 ORDER BY nome ASC",
            PRODUCT_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn list_low_stock(&self, usuario_id: i32) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {} FROM produtos
            WHERE usuario_id = $1 AND quantidade <= quantidade_minima
            ORDER BY quantidade ASC, nome ASC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find(&self, id: i32, usuario_id: i32) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM produtos WHERE id = $1 AND usuario_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update(&self, id: i32, usuario_id: i32, payload: &ProductPayload) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE produtos SET
                nome = $3,
                descricao = $4,
                quantidade = $5,
                quantidade_minima = COALESCE($6, quantidade_minima),
                preco_custo = $7,
                preco_venda = $8,
                updated_at = NOW()
            WHERE id = $1 AND usuario_id = $2
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .bind(payload.nome.as_deref().unwrap_or_default())
        .bind(payload.descricao.as_deref())
        .bind(payload.quantidade.unwrap_or_default())
        .bind(payload.quantidade_minima)
        .bind(payload.preco_custo)
        .bind(payload.preco_venda)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn delete(&self, id: i32, usuario_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM produtos WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(usuario_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Todos os produtos em falta de todos os prestadores, com o token de push
    /// e a preferência do dono (sem configuração = notificações ligadas).
    pub async fn low_stock_with_owners(&self) -> Result<Vec<LowStockRow>, AppError> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT
                u.id AS usuario_id,
                u.expo_push_token,
                COALESCE(c.notificacoes_ativas, TRUE) AS notificacoes_ativas,
                p.nome
            FROM produtos p
            JOIN usuarios u ON u.id = p.usuario_id
            LEFT JOIN configuracoes c ON c.usuario_id = u.id
            WHERE p.quantidade <= p.quantidade_minima
            ORDER BY u.id, p.nome
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
