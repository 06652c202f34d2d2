// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{PushTokenPayload, UpdateUserPayload, User},
    services::auth::AuthService,
};

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Usuários",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Perfil do usuário", body = User),
        (status = 403, description = "Perfil de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<User>, AppError> {
    Ok(Json(app_state.auth_service.get_profile(&user, id)?))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Usuários",
    params(("id" = i32, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Perfil de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    let updated = app_state.auth_service.update_profile(&user, id, &payload).await?;
    Ok(Json(updated))
}

// PUT /api/users/{id}/push-token
#[utoipa::path(
    put,
    path = "/api/users/{id}/push-token",
    tag = "Usuários",
    params(("id" = i32, Path, description = "ID do usuário")),
    request_body = PushTokenPayload,
    responses(
        (status = 200, description = "Token registrado"),
        (status = 403, description = "Perfil de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_push_token(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<PushTokenPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .auth_service
        .set_push_token(&user, id, payload.expo_push_token.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Token de notificação atualizado." })))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Usuários",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Conta e dados removidos"),
        (status = 403, description = "Perfil de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthService::ensure_self(&user, id)?;
    // Eventos do Google primeiro: a exclusão da conta leva os tokens junto
    let sincronizacao = app_state.scheduling_service.clear_remote_events(user.id).await?;
    app_state.auth_service.delete_account(&user, id).await?;
    Ok(Json(json!({
        "message": "Conta removida com sucesso.",
        "sincronizacao_google": sincronizacao,
    })))
}
