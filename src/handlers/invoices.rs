// src/handlers/invoices.rs

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
    models::invoice::{CancelInvoicePayload, Invoice, InvoicePayload},
};

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Notas Fiscais",
    request_body = InvoicePayload,
    responses(
        (status = 201, description = "NFS-e enviada para processamento", body = Invoice),
        (status = 400, description = "Dados inválidos ou perfil fiscal incompleto"),
        (status = 403, description = "Cliente de outro prestador"),
        (status = 500, description = "Erro retornado pelo provedor fiscal")
    ),
    security(("api_jwt" = []))
)]
pub async fn issue_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidJson(payload): ValidJson<InvoicePayload>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state.invoice_service.issue(&user, &payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Notas Fiscais",
    responses((status = 200, description = "Notas do prestador", body = Vec<Invoice>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(app_state.invoice_service.list(user.id).await?))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Notas Fiscais",
    params(("id" = i32, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota", body = Invoice),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(app_state.invoice_service.get(user.id, id).await?))
}

// GET /api/invoices/{id}/status
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/status",
    tag = "Notas Fiscais",
    params(("id" = i32, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota com o status consultado no provedor", body = Invoice),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh_invoice_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(app_state.invoice_service.refresh_status(user.id, id).await?))
}

// POST /api/invoices/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/cancel",
    tag = "Notas Fiscais",
    params(("id" = i32, Path, description = "ID da nota")),
    request_body = CancelInvoicePayload,
    responses(
        (status = 200, description = "Nota cancelada", body = Invoice),
        (status = 400, description = "Só notas emitidas podem ser canceladas"),
        (status = 403, description = "Nota de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<CancelInvoicePayload>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = app_state
        .invoice_service
        .cancel(user.id, id, payload.justificativa.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(invoice))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Notas Fiscais",
    params(("id" = i32, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Registro removido"),
        (status = 400, description = "Só notas pendentes ou com erro podem ser removidas"),
        (status = 403, description = "Nota de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.invoice_service.delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Nota removida com sucesso." })))
}
