// src/services/fiscal.rs
//
// Cliente do provedor de NFS-e (API no formato da Focus NFe).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::models::invoice::{InvoiceProviderUpdate, InvoiceStatus};

pub const DEFAULT_FISCAL_API_URL: &str = "https://homologacao.focusnfe.com.br";

#[derive(Debug, Error)]
pub enum FiscalError {
    // 4xx com `mensagem`/`erros`: a nota foi recusada
    #[error("{0}")]
    Rejected(String),

    #[error("provedor fiscal respondeu {status}: {body}")]
    Api { status: u16, body: String },

    #[error("falha de comunicação com o provedor fiscal: {0}")]
    Http(#[from] reqwest::Error),
}

impl FiscalError {
    /// Mensagem que pode ser mostrada ao prestador.
    pub fn detail(&self) -> String {
        match self {
            FiscalError::Rejected(detail) => detail.clone(),
            FiscalError::Api { status, .. } => format!("O provedor fiscal respondeu com erro {}.", status),
            FiscalError::Http(_) => "Não foi possível comunicar com o provedor fiscal.".to_string(),
        }
    }
}

// --- Payload de emissão ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prestador {
    pub cnpj: String,
    pub inscricao_municipal: String,
    pub codigo_municipio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Endereco {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_municipio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
}

impl Endereco {
    fn is_empty(&self) -> bool {
        *self == Endereco::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tomador {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    pub razao_social: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Endereco::is_empty")]
    pub endereco: Endereco,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Servico {
    pub valor_servicos: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliquota: Option<Decimal>,
    pub discriminacao: String,
    pub item_lista_servico: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_tributario_municipio: Option<String>,
    pub iss_retido: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NfseRequest {
    pub data_emissao: String,
    pub prestador: Prestador,
    pub tomador: Tomador,
    pub servico: Servico,
}

// --- Resposta ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderMessage {
    pub codigo: Option<String>,
    pub mensagem: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NfseResponse {
    #[serde(default)]
    pub status: String,
    pub numero: Option<String>,
    pub codigo_verificacao: Option<String>,
    pub data_emissao: Option<String>,
    pub url: Option<String>,
    pub url_danfse: Option<String>,
    pub caminho_xml_nota_fiscal: Option<String>,
    pub mensagem: Option<String>,
    #[serde(default)]
    pub erros: Vec<ProviderMessage>,
}

impl NfseResponse {
    /// `mensagem` do provedor ou, na falta dela, a lista de `erros`.
    pub fn error_detail(&self) -> Option<String> {
        if let Some(mensagem) = self.mensagem.as_deref().filter(|m| !m.is_empty()) {
            return Some(mensagem.to_string());
        }
        let erros: Vec<String> = self
            .erros
            .iter()
            .filter_map(|e| match (&e.codigo, &e.mensagem) {
                (Some(codigo), Some(mensagem)) => Some(format!("{}: {}", codigo, mensagem)),
                (None, Some(mensagem)) => Some(mensagem.clone()),
                _ => None,
            })
            .collect();
        if erros.is_empty() { None } else { Some(erros.join("; ")) }
    }

    /// Campos que o provedor devolve e que vão para `notas_fiscais`.
    pub fn to_update(&self, base_url: &str) -> InvoiceProviderUpdate {
        let status = InvoiceStatus::from_provider(&self.status);
        let url_xml = self.caminho_xml_nota_fiscal.as_ref().map(|path| {
            if path.starts_with("http") {
                path.clone()
            } else {
                format!("{}{}", base_url.trim_end_matches('/'), path)
            }
        });
        let data_emissao = self
            .data_emissao
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc));

        InvoiceProviderUpdate {
            status,
            numero: self.numero.clone(),
            codigo_verificacao: self.codigo_verificacao.clone(),
            url_pdf: self.url_danfse.clone().or_else(|| self.url.clone()),
            url_xml,
            mensagem_erro: if status == InvoiceStatus::Erro { self.error_detail() } else { None },
            data_emissao,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FiscalApi: Send + Sync {
    fn base_url(&self) -> String;
    async fn issue(&self, referencia: &str, request: &NfseRequest) -> Result<NfseResponse, FiscalError>;
    async fn consult(&self, referencia: &str) -> Result<NfseResponse, FiscalError>;
    async fn cancel(&self, referencia: &str, justificativa: &str) -> Result<NfseResponse, FiscalError>;
}

#[derive(Clone)]
pub struct FocusNfeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl FocusNfeClient {
    pub fn new(http: reqwest::Client, base_url: String, token: String) -> Self {
        Self { http, base_url, token }
    }

    fn nfse_url(&self, referencia: &str) -> String {
        format!("{}/v2/nfse/{}", self.base_url.trim_end_matches('/'), referencia)
    }

    // 4xx com mensagem legível vira `Rejected`; o resto fica como erro de API
    async fn read(&self, response: reqwest::Response) -> Result<NfseResponse, FiscalError> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<NfseResponse> = serde_json::from_str(&body).ok();

        if status.is_success() {
            return Ok(parsed.unwrap_or_default());
        }
        if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
            if let Some(detail) = parsed.as_ref().and_then(NfseResponse::error_detail) {
                return Err(FiscalError::Rejected(detail));
            }
        }
        Err(FiscalError::Api { status: status.as_u16(), body })
    }
}

#[async_trait]
impl FiscalApi for FocusNfeClient {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    // O token vai como usuário do Basic auth, com senha vazia
    async fn issue(&self, referencia: &str, request: &NfseRequest) -> Result<NfseResponse, FiscalError> {
        let response = self.http
            .post(format!("{}/v2/nfse", self.base_url.trim_end_matches('/')))
            .query(&[("ref", referencia)])
            .basic_auth(&self.token, Some(""))
            .json(request)
            .send()
            .await?;
        self.read(response).await
    }

    async fn consult(&self, referencia: &str) -> Result<NfseResponse, FiscalError> {
        let response = self.http
            .get(self.nfse_url(referencia))
            .basic_auth(&self.token, Some(""))
            .send()
            .await?;
        self.read(response).await
    }

    async fn cancel(&self, referencia: &str, justificativa: &str) -> Result<NfseResponse, FiscalError> {
        let response = self.http
            .delete(self.nfse_url(referencia))
            .basic_auth(&self.token, Some(""))
            .json(&json!({ "justificativa": justificativa }))
            .send()
            .await?;
        self.read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_detail_prefers_mensagem() {
        let response: NfseResponse = serde_json::from_value(json!({
            "codigo": "requisicao_invalida",
            "mensagem": "CNPJ do emitente não autorizado"
        }))
        .unwrap();

        assert_eq!(response.error_detail().as_deref(), Some("CNPJ do emitente não autorizado"));
    }

    #[test]
    fn rejection_detail_falls_back_to_erros() {
        let response: NfseResponse = serde_json::from_value(json!({
            "status": "erro_autorizacao",
            "erros": [
                { "codigo": "E10", "mensagem": "Tomador inválido" },
                { "mensagem": "Alíquota obrigatória" }
            ]
        }))
        .unwrap();

        assert_eq!(response.error_detail().as_deref(), Some("E10: Tomador inválido; Alíquota obrigatória"));

        let update = response.to_update(DEFAULT_FISCAL_API_URL);
        assert_eq!(update.status, InvoiceStatus::Erro);
        assert_eq!(update.mensagem_erro.as_deref(), Some("E10: Tomador inválido; Alíquota obrigatória"));
    }

    #[test]
    fn authorized_response_fills_the_invoice() {
        let response: NfseResponse = serde_json::from_value(json!({
            "status": "autorizado",
            "numero": "1234",
            "codigo_verificacao": "ABCD-1234",
            "data_emissao": "2024-06-01T14:35:02-03:00",
            "url": "https://prefeitura.example/nfse/1234",
            "caminho_xml_nota_fiscal": "/arquivos/nfse_1234.xml"
        }))
        .unwrap();

        let update = response.to_update("https://api.focusnfe.com.br/");

        assert_eq!(update.status, InvoiceStatus::Emitida);
        assert_eq!(update.numero.as_deref(), Some("1234"));
        assert_eq!(update.url_pdf.as_deref(), Some("https://prefeitura.example/nfse/1234"));
        assert_eq!(update.url_xml.as_deref(), Some("https://api.focusnfe.com.br/arquivos/nfse_1234.xml"));
        assert_eq!(update.mensagem_erro, None);
        assert_eq!(update.data_emissao.map(|d| d.to_rfc3339()), Some("2024-06-01T17:35:02+00:00".to_string()));
    }

    #[test]
    fn request_uses_provider_field_names() {
        let request = NfseRequest {
            data_emissao: "2024-06-01T10:00:00-03:00".into(),
            prestador: Prestador {
                cnpj: "12345678000199".into(),
                inscricao_municipal: "123456".into(),
                codigo_municipio: "3550308".into(),
            },
            tomador: Tomador {
                cpf: Some("12345678909".into()),
                cnpj: None,
                razao_social: "Maria da Silva".into(),
                email: None,
                telefone: None,
                endereco: Endereco::default(),
            },
            servico: Servico {
                valor_servicos: Decimal::new(35000, 2),
                aliquota: Some(Decimal::new(200, 2)),
                discriminacao: "Manutenção".into(),
                item_lista_servico: "14.01".into(),
                codigo_tributario_municipio: None,
                iss_retido: false,
            },
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["servico"]["valor_servicos"], 350.0);
        assert_eq!(json["servico"]["aliquota"], 2.0);
        assert_eq!(json["tomador"]["cpf"], "12345678909");
        assert!(json["tomador"].get("cnpj").is_none());
        assert!(json["tomador"].get("endereco").is_none());
    }
}
