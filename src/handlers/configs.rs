// src/handlers/configs.rs

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::config::{Configuration, UpdateConfigPayload},
};

// GET /api/configs/{usuario_id}
#[utoipa::path(
    get,
    path = "/api/configs/{usuario_id}",
    tag = "Configurações",
    params(("usuario_id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Preferências do prestador", body = Configuration),
        (status = 403, description = "Configurações de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(usuario_id): Path<i32>,
) -> Result<Json<Configuration>, AppError> {
    if usuario_id != user.id {
        return Err(AppError::Forbidden);
    }
    let row = app_state.config_repo.get_or_create(user.id).await?;
    Ok(Json(row.into()))
}

// PUT /api/configs/{usuario_id}
#[utoipa::path(
    put,
    path = "/api/configs/{usuario_id}",
    tag = "Configurações",
    params(("usuario_id" = i32, Path, description = "ID do usuário")),
    request_body = UpdateConfigPayload,
    responses(
        (status = 200, description = "Preferências atualizadas", body = Configuration),
        (status = 403, description = "Configurações de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_config(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(usuario_id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateConfigPayload>,
) -> Result<Json<Configuration>, AppError> {
    if usuario_id != user.id {
        return Err(AppError::Forbidden);
    }
    let row = app_state
        .config_repo
        .update(user.id, payload.notificacoes_ativas, payload.google_calendar_ativo)
        .await?;
    Ok(Json(row.into()))
}
