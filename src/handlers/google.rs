// src/handlers/google.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::config::{ExchangeCodePayload, GoogleStatus},
};

// POST /api/google/exchange-code
#[utoipa::path(
    post,
    path = "/api/google/exchange-code",
    tag = "Google Calendar",
    request_body = ExchangeCodePayload,
    responses(
        (status = 200, description = "Conta Google conectada"),
        (status = 400, description = "Código rejeitado pelo Google")
    ),
    security(("api_jwt" = []))
)]
pub async fn exchange_code(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidJson(payload): ValidJson<ExchangeCodePayload>,
) -> Result<impl IntoResponse, AppError> {
    let redirect_uri = payload
        .redirect_uri
        .as_deref()
        .filter(|uri| !uri.is_empty())
        .unwrap_or(&app_state.google_redirect_uri);

    app_state
        .calendar_sync
        .connect(user.id, payload.code.as_deref().unwrap_or_default(), redirect_uri)
        .await?;

    Ok(Json(json!({ "message": "Google Calendar conectado com sucesso." })))
}

// GET /api/google/status
#[utoipa::path(
    get,
    path = "/api/google/status",
    tag = "Google Calendar",
    responses((status = 200, description = "Há uma conta Google conectada?", body = GoogleStatus)),
    security(("api_jwt" = []))
)]
pub async fn google_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<GoogleStatus>, AppError> {
    // Só olha os tokens salvos; não chama o Google
    let conectado = app_state
        .config_repo
        .find(user.id)
        .await?
        .is_some_and(|row| row.google_refresh_token.is_some());
    Ok(Json(GoogleStatus { conectado }))
}

// DELETE /api/google/connection
#[utoipa::path(
    delete,
    path = "/api/google/connection",
    tag = "Google Calendar",
    responses((status = 200, description = "Tokens removidos e integração desligada")),
    security(("api_jwt" = []))
)]
pub async fn disconnect(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    app_state.calendar_sync.disconnect(user.id).await?;
    Ok(Json(json!({ "message": "Google Calendar desconectado." })))
}
