// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i32,
    #[schema(ignore)]
    pub usuario_id: i32,

    #[schema(example = "Filtro de óleo")]
    pub nome: String,
    pub descricao: Option<String>,

    #[schema(example = 12)]
    pub quantidade: i32,
    // Abaixo (ou igual) deste limite o produto entra no alerta de estoque baixo
    #[schema(example = 5)]
    pub quantidade_minima: i32,

    #[schema(example = "18.90")]
    pub preco_custo: Option<Decimal>,
    #[schema(example = "35.00")]
    pub preco_venda: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantidade <= self.quantidade_minima
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(
        required(message = "O nome do produto é obrigatório."),
        length(min = 1, message = "O nome do produto é obrigatório.")
    )]
    pub nome: Option<String>,

    pub descricao: Option<String>,

    #[validate(
        required(message = "A quantidade é obrigatória."),
        range(min = 0, message = "A quantidade não pode ser negativa.")
    )]
    pub quantidade: Option<i32>,

    #[validate(range(min = 0, message = "A quantidade mínima não pode ser negativa."))]
    pub quantidade_minima: Option<i32>,

    pub preco_custo: Option<Decimal>,
    pub preco_venda: Option<Decimal>,
}
