// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,

        // --- Usuários ---
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::update_push_token,
        handlers::users::delete_user,

        // --- Clientes ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Produtos ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::list_low_stock,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Financeiro ---
        handlers::transactions::create_transaction,
        handlers::transactions::list_transactions,
        handlers::transactions::get_summary,
        handlers::transactions::get_transaction,
        handlers::transactions::update_transaction,
        handlers::transactions::delete_transaction,

        // --- NFS-e ---
        handlers::invoices::issue_invoice,
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::refresh_invoice_status,
        handlers::invoices::cancel_invoice,
        handlers::invoices::delete_invoice,

        // --- Agenda ---
        handlers::scheduled_services::create_scheduled_service,
        handlers::scheduled_services::list_scheduled_services,
        handlers::scheduled_services::get_scheduled_service,
        handlers::scheduled_services::update_scheduled_service,
        handlers::scheduled_services::delete_scheduled_service,

        // --- Configurações ---
        handlers::configs::get_config,
        handlers::configs::update_config,

        // --- Google ---
        handlers::google::exchange_code,
        handlers::google::google_status,
        handlers::google::disconnect,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::UpdateUserPayload,
            models::auth::PushTokenPayload,
            models::auth::AuthResponse,

            // --- Clientes e Produtos ---
            models::client::Client,
            models::client::ClientPayload,
            models::product::Product,
            models::product::ProductPayload,

            // --- Financeiro ---
            models::transaction::TransactionKind,
            models::transaction::Transaction,
            models::transaction::TransactionPayload,
            models::transaction::TransactionSummary,

            // --- NFS-e ---
            models::invoice::InvoiceStatus,
            models::invoice::Invoice,
            models::invoice::TomadorPayload,
            models::invoice::InvoicePayload,
            models::invoice::CancelInvoicePayload,

            // --- Agenda ---
            models::scheduled_service::AppointmentStatus,
            models::scheduled_service::ScheduledService,
            models::scheduled_service::CreateScheduledServicePayload,
            models::scheduled_service::UpdateScheduledServicePayload,
            models::scheduled_service::CalendarSyncStatus,
            models::scheduled_service::ScheduledServiceResponse,

            // --- Configurações ---
            models::config::Configuration,
            models::config::UpdateConfigPayload,
            models::config::ExchangeCodePayload,
            models::config::GoogleStatus,
        )
    ),
    tags(
        (name = "Auth", description = "Login, Cadastro e Recuperação de Senha"),
        (name = "Usuários", description = "Perfil e Dados Fiscais do Prestador"),
        (name = "Clientes", description = "Cadastro de Clientes"),
        (name = "Produtos", description = "Estoque e Alertas de Estoque Baixo"),
        (name = "Financeiro", description = "Entradas, Saídas e Resumo"),
        (name = "Notas Fiscais", description = "Emissão de NFS-e"),
        (name = "Agenda", description = "Serviços Agendados e Google Calendar"),
        (name = "Configurações", description = "Preferências do Prestador"),
        (name = "Google Calendar", description = "Conexão OAuth com o Google")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
