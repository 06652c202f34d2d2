// src/models/invoice.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE status_nota do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_nota", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pendente,
    Emitida,
    Erro,
    Cancelada,
}

impl InvoiceStatus {
    /// Traduz o status devolvido pelo provedor de NFS-e.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "autorizado" => InvoiceStatus::Emitida,
            "cancelado" => InvoiceStatus::Cancelada,
            "erro_autorizacao" | "erro_cancelamento" => InvoiceStatus::Erro,
            _ => InvoiceStatus::Pendente,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Invoice {
    pub id: i32,
    #[schema(ignore)]
    pub usuario_id: i32,
    pub cliente_id: Option<i32>,

    // Referência idempotente enviada ao provedor ("nf_<id>")
    #[schema(example = "nf_42")]
    pub referencia: Option<String>,

    #[schema(example = "Manutenção preventiva do veículo ABC-1234")]
    pub discriminacao: String,
    #[schema(example = "350.00")]
    pub valor_servicos: Decimal,
    #[schema(example = "2.00")]
    pub aliquota: Option<Decimal>,
    #[schema(example = "14.01")]
    pub item_lista_servico: String,

    pub status: InvoiceStatus,
    pub numero: Option<String>,
    pub codigo_verificacao: Option<String>,
    pub url_pdf: Option<String>,
    pub url_xml: Option<String>,
    pub mensagem_erro: Option<String>,
    pub data_emissao: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resultado de uma chamada ao provedor, aplicado sobre a linha local.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceProviderUpdate {
    pub status: InvoiceStatus,
    pub numero: Option<String>,
    pub codigo_verificacao: Option<String>,
    pub url_pdf: Option<String>,
    pub url_xml: Option<String>,
    pub mensagem_erro: Option<String>,
    pub data_emissao: Option<DateTime<Utc>>,
}

// Tomador informado diretamente na emissão (sem cliente cadastrado)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TomadorPayload {
    #[validate(required(message = "O CPF/CNPJ do tomador é obrigatório."))]
    #[schema(example = "123.456.789-09")]
    pub cpf_cnpj: Option<String>,

    #[validate(
        required(message = "A razão social do tomador é obrigatória."),
        length(min = 1, message = "A razão social do tomador é obrigatória.")
    )]
    pub razao_social: Option<String>,

    #[validate(email(message = "O e-mail do tomador é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub logradouro: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub codigo_municipio: Option<String>,
    pub uf: Option<String>,
    pub cep: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InvoicePayload {
    // Cliente cadastrado que será o tomador; alternativa ao bloco `tomador`
    #[schema(example = 1)]
    pub cliente_id: Option<i32>,

    #[validate(nested)]
    pub tomador: Option<TomadorPayload>,

    #[validate(
        required(message = "A discriminação do serviço é obrigatória."),
        length(min = 1, message = "A discriminação do serviço é obrigatória.")
    )]
    pub discriminacao: Option<String>,

    #[validate(
        required(message = "O valor dos serviços é obrigatório."),
        custom(function = "validate_valor_servicos")
    )]
    pub valor_servicos: Option<Decimal>,

    pub aliquota: Option<Decimal>,

    #[validate(
        required(message = "O item da lista de serviço é obrigatório."),
        length(min = 1, message = "O item da lista de serviço é obrigatório.")
    )]
    pub item_lista_servico: Option<String>,

    pub codigo_tributario_municipio: Option<String>,

    #[serde(default)]
    pub iss_retido: bool,
}

fn validate_valor_servicos(valor: &Decimal) -> Result<(), validator::ValidationError> {
    if *valor <= Decimal::ZERO {
        let mut err = validator::ValidationError::new("valor_positivo");
        err.message = Some("O valor dos serviços deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelInvoicePayload {
    #[validate(
        required(message = "A justificativa é obrigatória."),
        length(min = 15, max = 255, message = "A justificativa deve ter entre 15 e 255 caracteres.")
    )]
    pub justificativa: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_provider_statuses() {
        assert_eq!(InvoiceStatus::from_provider("autorizado"), InvoiceStatus::Emitida);
        assert_eq!(InvoiceStatus::from_provider("cancelado"), InvoiceStatus::Cancelada);
        assert_eq!(InvoiceStatus::from_provider("erro_autorizacao"), InvoiceStatus::Erro);
        assert_eq!(InvoiceStatus::from_provider("processando_autorizacao"), InvoiceStatus::Pendente);
        assert_eq!(InvoiceStatus::from_provider("qualquer_outro"), InvoiceStatus::Pendente);
    }
}
