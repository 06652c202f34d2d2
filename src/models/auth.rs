// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Representa um prestador (usuário) vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Oficina do João")]
    pub nome: String,
    #[schema(example = "joao@oficina.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub senha_hash: String,

    pub telefone: Option<String>,

    // Perfil fiscal (necessário para emitir NFS-e)
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,
    pub razao_social: Option<String>,
    #[schema(example = "123456")]
    pub inscricao_municipal: Option<String>,
    #[schema(example = "3550308")]
    pub codigo_municipio: Option<String>,

    pub expo_push_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expira_em: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_tentativas: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para cadastro de um novo prestador
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(
        required(message = "O nome é obrigatório."),
        length(min = 2, message = "O nome deve ter no mínimo 2 caracteres.")
    )]
    #[schema(example = "Oficina do João")]
    pub nome: Option<String>,

    #[validate(
        required(message = "O e-mail é obrigatório."),
        email(message = "O e-mail fornecido é inválido.")
    )]
    #[schema(example = "joao@oficina.com")]
    pub email: Option<String>,

    #[validate(
        required(message = "A senha é obrigatória."),
        length(min = 6, message = "A senha deve ter no mínimo 6 caracteres.")
    )]
    pub senha: Option<String>,

    pub telefone: Option<String>,
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,
    pub razao_social: Option<String>,
    pub inscricao_municipal: Option<String>,
    pub codigo_municipio: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(
        required(message = "O e-mail é obrigatório."),
        email(message = "O e-mail fornecido é inválido.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "A senha é obrigatória."))]
    pub senha: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(
        required(message = "O e-mail é obrigatório."),
        email(message = "O e-mail fornecido é inválido.")
    )]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(
        required(message = "O e-mail é obrigatório."),
        email(message = "O e-mail fornecido é inválido.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "O código é obrigatório."),
        length(equal = 6, message = "O código deve ter 6 dígitos.")
    )]
    #[schema(example = "048213")]
    pub codigo: Option<String>,

    #[validate(
        required(message = "A nova senha é obrigatória."),
        length(min = 6, message = "A senha deve ter no mínimo 6 caracteres.")
    )]
    pub nova_senha: Option<String>,
}

// Atualização do perfil; campos ausentes mantêm o valor atual
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub nome: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cnpj: Option<String>,
    pub razao_social: Option<String>,
    pub inscricao_municipal: Option<String>,
    pub codigo_municipio: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PushTokenPayload {
    // `null` remove o token do aparelho
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]")]
    pub expo_push_token: Option<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
