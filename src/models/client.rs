// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(ignore)]
    pub usuario_id: i32,

    #[schema(example = "Maria da Silva")]
    pub nome: String,
    #[schema(example = "maria@email.com")]
    pub email: Option<String>,
    #[schema(example = "(11) 99999-8888")]
    pub telefone: Option<String>,
    #[schema(example = "123.456.789-09")]
    pub cpf_cnpj: Option<String>,

    // Endereço (usado como tomador na NFS-e)
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    #[schema(example = "SP")]
    pub uf: Option<String>,
    #[schema(example = "01001-000")]
    pub cep: Option<String>,

    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Mesmo payload para criação e edição (PUT substitui o cadastro)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClientPayload {
    #[validate(
        required(message = "O nome do cliente é obrigatório."),
        length(min = 1, message = "O nome do cliente é obrigatório.")
    )]
    #[schema(example = "Maria da Silva")]
    pub nome: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(equal = 2, message = "A UF deve ter 2 letras."))]
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub observacoes: Option<String>,
}
