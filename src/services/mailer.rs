// src/services/mailer.rs

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::common::error::AppError;

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_code(&self, to: &str, nome: &str, code: &str) -> Result<(), AppError>;
}

pub fn reset_code_body(nome: &str, code: &str) -> String {
    format!(
        "Olá, {}!\n\nSeu código para redefinir a senha é: {}\n\nEle vale por 1 hora. \
         Se você não pediu a redefinição, ignore este e-mail.",
        nome, code
    )
}

// --- SMTP (STARTTLS) ---

pub struct SmtpMailer {
    settings: Arc<SmtpSettings>,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings: Arc::new(settings) }
    }
}

fn build_transport(s: &SmtpSettings) -> Result<SmtpTransport, AppError> {
    let mut builder = SmtpTransport::starttls_relay(&s.host)
        .map_err(|e| anyhow::anyhow!("Host SMTP inválido: {}", e))?
        .port(s.port);

    if let (Some(user), Some(password)) = (&s.user, &s.password) {
        builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
    }
    Ok(builder.build())
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_code(&self, to: &str, nome: &str, code: &str) -> Result<(), AppError> {
        let from: Mailbox = self.settings
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Remetente SMTP inválido: {}", e))?;
        let to: Mailbox = to
            .parse()
            .map_err(|_| AppError::BadRequest("O e-mail fornecido é inválido.".into()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject("Código de redefinição de senha")
            .header(ContentType::TEXT_PLAIN)
            .body(reset_code_body(nome, code))
            .map_err(|e| anyhow::anyhow!("Falha ao montar o e-mail: {}", e))?;

        // O transporte do lettre é bloqueante
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || {
            let transport = build_transport(&settings)?;
            transport
                .send(&email)
                .map_err(|e| anyhow::anyhow!("Falha no envio SMTP: {}", e))?;
            Ok::<(), AppError>(())
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de envio de e-mail: {}", e))??;

        Ok(())
    }
}

// --- Sem SMTP configurado (desenvolvimento) ---

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_code(&self, to: &str, _nome: &str, code: &str) -> Result<(), AppError> {
        tracing::warn!("SMTP não configurado; código de redefinição para {}: {}", to, code);
        Ok(())
    }
}
