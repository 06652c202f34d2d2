// src/handlers/products.rs

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
    models::product::{Product, ProductPayload},
};

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidJson(payload): ValidJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_repo.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Produtos",
    responses((status = 200, description = "Estoque do prestador", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.product_repo.list(user.id).await?))
}

// GET /api/products/low-stock
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Produtos",
    responses((status = 200, description = "Produtos com quantidade <= quantidade mínima", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.product_repo.list_low_stock(user.id).await?))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    let product = app_state
        .product_repo
        .find(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;
    Ok(Json(product))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = i32, Path, description = "ID do produto")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 403, description = "Produto de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidJson(payload): ValidJson<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    let product = app_state
        .product_repo
        .update(id, user.id, &payload)
        .await?
        .ok_or(AppError::Forbidden)?;

    if product.is_low_stock() {
        tracing::info!("📦 Produto {} entrou em estoque baixo ({} un.)", product.id, product.quantidade);
    }
    Ok(Json(product))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido"),
        (status = 403, description = "Produto de outro prestador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.product_repo.delete(id, user.id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(Json(json!({ "message": "Produto removido com sucesso." })))
}
