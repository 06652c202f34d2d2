// src/routes.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn create_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/cadastro", post(handlers::auth::register))
        .route("/api/forgot-password", post(handlers::auth::forgot_password))
        .route("/api/reset-password", post(handlers::auth::reset_password));

    // Tudo abaixo exige o JWT
    let protected_routes = Router::new()
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/users/{id}/push-token", put(handlers::users::update_push_token))
        // Clientes
        .route(
            "/api/clients",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/api/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        // Estoque
        .route(
            "/api/products",
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route("/api/products/low-stock", get(handlers::products::list_low_stock))
        .route(
            "/api/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Financeiro
        .route(
            "/api/transactions",
            post(handlers::transactions::create_transaction).get(handlers::transactions::list_transactions),
        )
        .route("/api/transactions/summary", get(handlers::transactions::get_summary))
        .route(
            "/api/transactions/{id}",
            get(handlers::transactions::get_transaction)
                .put(handlers::transactions::update_transaction)
                .delete(handlers::transactions::delete_transaction),
        )
        // NFS-e
        .route(
            "/api/invoices",
            post(handlers::invoices::issue_invoice).get(handlers::invoices::list_invoices),
        )
        .route(
            "/api/invoices/{id}",
            get(handlers::invoices::get_invoice).delete(handlers::invoices::delete_invoice),
        )
        .route("/api/invoices/{id}/status", get(handlers::invoices::refresh_invoice_status))
        .route("/api/invoices/{id}/cancel", post(handlers::invoices::cancel_invoice))
        // Agenda
        .route(
            "/api/scheduled-services",
            post(handlers::scheduled_services::create_scheduled_service)
                .get(handlers::scheduled_services::list_scheduled_services),
        )
        .route(
            "/api/scheduled-services/{id}",
            get(handlers::scheduled_services::get_scheduled_service)
                .put(handlers::scheduled_services::update_scheduled_service)
                .delete(handlers::scheduled_services::delete_scheduled_service),
        )
        // Configurações e Google
        .route(
            "/api/configs/{usuario_id}",
            get(handlers::configs::get_config).put(handlers::configs::update_config),
        )
        .route("/api/google/exchange-code", post(handlers::google::exchange_code))
        .route("/api/google/status", get(handlers::google::google_status))
        .route("/api/google/connection", delete(handlers::google::disconnect))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
