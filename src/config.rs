// src/config.rs

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        ClientRepository, ConfigRepository, InvoiceRepository, ProductRepository, ScheduledServiceRepository,
        TransactionRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        calendar_sync::CalendarSync,
        fiscal::{DEFAULT_FISCAL_API_URL, FocusNfeClient},
        google::GoogleClient,
        invoice_service::InvoiceService,
        mailer::{LogMailer, Mailer, SmtpMailer, SmtpSettings},
        notification_service::NotificationService,
        push::ExpoPushClient,
        scheduling_service::SchedulingService,
        token_store::PgTokenStore,
    },
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Default)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub google: GoogleSettings,
    pub fiscal_api_url: String,
    pub fiscal_api_token: String,
    pub expo_access_token: Option<String>,
    pub smtp: Option<SmtpSettings>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca; vazio conta como ausente.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{} deve ser definida", key));

        let smtp = match get("SMTP_HOST") {
            Some(host) => {
                let port = match get("SMTP_PORT") {
                    Some(raw) => raw.parse::<u16>().with_context(|| format!("SMTP_PORT inválida: {}", raw))?,
                    None => 587,
                };
                let user = get("SMTP_USER");
                let from = get("SMTP_FROM")
                    .or_else(|| user.clone())
                    .context("SMTP_FROM deve ser definida quando SMTP_HOST está presente")?;
                Some(SmtpSettings { host, port, user, password: get("SMTP_PASSWORD"), from })
            }
            None => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            google: GoogleSettings {
                client_id: get("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: get("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                redirect_uri: get("GOOGLE_REDIRECT_URI").unwrap_or_default(),
            },
            fiscal_api_url: get("FISCAL_API_URL").unwrap_or_else(|| DEFAULT_FISCAL_API_URL.to_string()),
            fiscal_api_token: get("FISCAL_API_TOKEN").unwrap_or_default(),
            expo_access_token: get("EXPO_ACCESS_TOKEN"),
            smtp,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub google_redirect_uri: String,

    pub client_repo: ClientRepository,
    pub product_repo: ProductRepository,
    pub transaction_repo: TransactionRepository,
    pub config_repo: ConfigRepository,

    pub auth_service: AuthService,
    pub calendar_sync: CalendarSync,
    pub scheduling_service: SchedulingService,
    pub invoice_service: InvoiceService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::build(db_pool, settings)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn build(db_pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gestao-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        if settings.google.client_id.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID não definida; a integração com o Google Calendar vai falhar");
        }
        if settings.fiscal_api_token.is_empty() {
            tracing::warn!("FISCAL_API_TOKEN não definida; a emissão de NFS-e vai falhar");
        }

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let config_repo = ConfigRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let transaction_repo = TransactionRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let scheduled_repo = ScheduledServiceRepository::new(db_pool.clone());

        // --- Integrações ---
        let mailer: Arc<dyn Mailer> = match &settings.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp.clone())),
            None => Arc::new(LogMailer),
        };
        let google = GoogleClient::new(
            http.clone(),
            settings.google.client_id.clone(),
            settings.google.client_secret.clone(),
        );
        let fiscal = FocusNfeClient::new(
            http.clone(),
            settings.fiscal_api_url.clone(),
            settings.fiscal_api_token.clone(),
        );
        let push = ExpoPushClient::new(http, settings.expo_access_token.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(
            db_pool.clone(),
            user_repo,
            config_repo.clone(),
            mailer,
            settings.jwt_secret.clone(),
        );
        let calendar_sync = CalendarSync::new(
            Arc::new(PgTokenStore::new(config_repo.clone())),
            Arc::new(google),
        );
        let scheduling_service = SchedulingService::new(
            db_pool.clone(),
            scheduled_repo,
            client_repo.clone(),
            calendar_sync.clone(),
        );
        let invoice_service = InvoiceService::new(
            db_pool.clone(),
            invoice_repo,
            client_repo.clone(),
            Arc::new(fiscal),
        );
        let notification_service = NotificationService::new(product_repo.clone(), Arc::new(push));

        Ok(Self {
            db_pool,
            google_redirect_uri: settings.google.redirect_uri.clone(),
            client_repo,
            product_repo,
            transaction_repo,
            config_repo,
            auth_service,
            calendar_sync,
            scheduling_service,
            invoice_service,
            notification_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gestao"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(settings.fiscal_api_url, DEFAULT_FISCAL_API_URL);
        assert!(settings.expo_access_token.is_none());
        assert!(settings.smtp.is_none());
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/gestao"), ("JWT_SECRET", "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn smtp_is_enabled_by_its_host() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gestao"),
            ("JWT_SECRET", "segredo"),
            ("SMTP_HOST", "smtp.exemplo.com"),
            ("SMTP_USER", "contato@exemplo.com"),
        ]))
        .unwrap();

        let smtp = settings.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from, "contato@exemplo.com");
    }

    #[test]
    fn invalid_smtp_port_is_rejected() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gestao"),
            ("JWT_SECRET", "segredo"),
            ("SMTP_HOST", "smtp.exemplo.com"),
            ("SMTP_FROM", "a@b.com"),
            ("SMTP_PORT", "porta"),
        ]));
        assert!(result.is_err());
    }
}
