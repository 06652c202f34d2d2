// src/handlers/transactions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    common::{error::AppError, extract::ValidJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::transaction::{Transaction, TransactionFilter, TransactionPayload, TransactionSummary},
};

fn check_period(filter: &TransactionFilter) -> Result<(), AppError> {
    if let (Some(inicio), Some(fim)) = (filter.inicio, filter.fim) {
        if inicio > fim {
            return Err(AppError::BadRequest("A data inicial não pode ser posterior à final.".into()));
        }
    }
    Ok(())
}

// POST /api/transactions
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Financeiro",
    request_body = TransactionPayload,
    responses(
        (status = 201, description = "Lançamento criado", body = Transaction),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidJson(payload): ValidJson<TransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = app_state.transaction_repo.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

// GET /api/transactions?tipo=&inicio=&fim=
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Financeiro",
    params(TransactionFilter),
    responses((status = 200, description = "Lançamentos do período", body = Vec<Transaction>)),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    check_period(&filter)?;
    Ok(Json(app_state.transaction_repo.list(user.id, &filter).await?))
}

// GET /api/transactions/summary?inicio=&fim=
#[utoipa::path(
    get,
    path = "/api/transactions/summary",
    tag = "Financeiro",
    params(TransactionFilter),
    responses((status = 200, description = "Entradas, saídas e saldo do período", body = TransactionSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<TransactionSummary>, AppError> {
    check_period(&filter)?;
    Ok(Json(app_state.transaction_repo.summary(user.id, &filter).await?))
}

// GET /api/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "Financeiro",
    params(("id" = i32, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento", body = Transaction),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = app_state
        .transaction_repo
        .find(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Lançamento"))?;
    Ok(Json(transaction))
}

// PUT /api/transactions/{id}
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    tag = "Financeiro",
    params(("id" = i32, Path, description = "ID do lançamento")),
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Lançamento atualizado", body = Transaction),
        (status = 403, description = "Lançamento de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<TransactionPayload>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = app_state
        .transaction_repo
        .update(id, user.id, &payload)
        .await?
        .ok_or(AppError::Forbidden)?;
    Ok(Json(transaction))
}

// DELETE /api/transactions/{id}
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "Financeiro",
    params(("id" = i32, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento removido"),
        (status = 403, description = "Lançamento de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.transaction_repo.delete(id, user.id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(Json(json!({ "message": "Lançamento removido com sucesso." })))
}
