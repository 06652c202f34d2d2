// src/models/transaction.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// Mapeia o CREATE TYPE tipo_transacao do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_transacao")]
pub enum TransactionKind {
    Entrada,
    #[sqlx(rename = "Saída")]
    #[serde(rename = "Saída")]
    Saida,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    #[schema(ignore)]
    pub usuario_id: i32,

    pub tipo: TransactionKind,
    #[schema(example = "Troca de óleo - Maria")]
    pub descricao: String,
    #[schema(example = "150.00")]
    pub valor: Decimal,
    #[schema(value_type = String, format = Date, example = "2024-06-01")]
    pub data: NaiveDate,
    #[schema(example = "Serviços")]
    pub categoria: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransactionPayload {
    #[validate(required(message = "O tipo (Entrada ou Saída) é obrigatório."))]
    pub tipo: Option<TransactionKind>,

    #[validate(
        required(message = "A descrição é obrigatória."),
        length(min = 1, message = "A descrição é obrigatória.")
    )]
    pub descricao: Option<String>,

    #[validate(required(message = "O valor é obrigatório."), custom(function = "validate_valor"))]
    pub valor: Option<Decimal>,

    #[validate(required(message = "A data é obrigatória."))]
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub data: Option<NaiveDate>,

    pub categoria: Option<String>,
}

fn validate_valor(valor: &Decimal) -> Result<(), validator::ValidationError> {
    if *valor <= Decimal::ZERO {
        let mut err = validator::ValidationError::new("valor_positivo");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// GET /api/transactions?tipo=Entrada&inicio=2024-06-01&fim=2024-06-30
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    pub tipo: Option<TransactionKind>,
    #[param(value_type = Option<String>, format = Date)]
    pub inicio: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub fim: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TransactionSummary {
    #[schema(example = "1500.00")]
    pub total_entradas: Decimal,
    #[schema(example = "420.50")]
    pub total_saidas: Decimal,
    #[schema(example = "1079.50")]
    pub saldo: Decimal,
}
