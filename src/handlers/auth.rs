// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    models::auth::{
        AuthResponse, ForgotPasswordPayload, LoginUserPayload, RegisterUserPayload, ResetPasswordPayload,
    },
};

// POST /api/cadastro
#[utoipa::path(
    post,
    path = "/api/cadastro",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Prestador cadastrado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.auth_service.register_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = app_state
        .auth_service
        .login_user(
            payload.email.as_deref().unwrap_or_default(),
            payload.senha.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(response))
}

// POST /api/forgot-password
#[utoipa::path(
    post,
    path = "/api/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Se o e-mail existir, o código foi enviado")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .auth_service
        .forgot_password(payload.email.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(json!({
        "message": "Se o e-mail estiver cadastrado, você receberá um código para redefinir a senha."
    })))
}

// POST /api/reset-password
#[utoipa::path(
    post,
    path = "/api/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida"),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .auth_service
        .reset_password(
            payload.email.as_deref().unwrap_or_default(),
            payload.codigo.as_deref().unwrap_or_default(),
            payload.nova_senha.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(json!({ "message": "Senha redefinida com sucesso." })))
}
