// src/handlers/scheduled_services.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::scheduled_service::{
        CreateScheduledServicePayload, ScheduledService, ScheduledServiceResponse, UpdateScheduledServicePayload,
    },
};

// POST /api/scheduled-services
#[utoipa::path(
    post,
    path = "/api/scheduled-services",
    tag = "Agenda",
    request_body = CreateScheduledServicePayload,
    responses(
        (status = 201, description = "Agendamento criado (e espelhado no Google, se ativo)", body = ScheduledServiceResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Cliente de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_scheduled_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidJson(payload): ValidJson<CreateScheduledServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.scheduling_service.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/scheduled-services
#[utoipa::path(
    get,
    path = "/api/scheduled-services",
    tag = "Agenda",
    responses((status = 200, description = "Agenda do prestador", body = Vec<ScheduledService>)),
    security(("api_jwt" = []))
)]
pub async fn list_scheduled_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ScheduledService>>, AppError> {
    Ok(Json(app_state.scheduling_service.list(user.id).await?))
}

// GET /api/scheduled-services/{id}
#[utoipa::path(
    get,
    path = "/api/scheduled-services/{id}",
    tag = "Agenda",
    params(("id" = i32, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento", body = ScheduledService),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_scheduled_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<ScheduledService>, AppError> {
    Ok(Json(app_state.scheduling_service.get(user.id, id).await?))
}

// PUT /api/scheduled-services/{id}
#[utoipa::path(
    put,
    path = "/api/scheduled-services/{id}",
    tag = "Agenda",
    params(("id" = i32, Path, description = "ID do agendamento")),
    request_body = UpdateScheduledServicePayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = ScheduledServiceResponse),
        (status = 403, description = "Agendamento ou cliente de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_scheduled_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<UpdateScheduledServicePayload>,
) -> Result<Json<ScheduledServiceResponse>, AppError> {
    Ok(Json(app_state.scheduling_service.update(user.id, id, &payload).await?))
}

// DELETE /api/scheduled-services/{id}
#[utoipa::path(
    delete,
    path = "/api/scheduled-services/{id}",
    tag = "Agenda",
    params(("id" = i32, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento removido"),
        (status = 403, description = "Agendamento de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_scheduled_service(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.scheduling_service.delete(user.id, id).await?;
    Ok(Json(json!({
        "message": "Agendamento removido com sucesso.",
        "sincronizacao_google": status,
    })))
}
