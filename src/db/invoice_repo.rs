// src/db/invoice_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::invoice::{Invoice, InvoiceProviderUpdate, InvoiceStatus},
};

const INVOICE_COLUMNS: &str = "id, usuario_id, cliente_id, referencia, discriminacao, valor_servicos, \
    aliquota, item_lista_servico, status, numero, codigo_verificacao, url_pdf, url_xml, \
    mensagem_erro, data_emissao, created_at, updated_at";

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava a nota como `pendente` e fixa a referência `nf_<id>` usada no provedor.
    pub async fn create_pending(
        &self,
        usuario_id: i32,
        cliente_id: Option<i32>,
        discriminacao: &str,
        valor_servicos: Decimal,
        aliquota: Option<Decimal>,
        item_lista_servico: &str,
    ) -> Result<Invoice, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO notas_fiscais (usuario_id, cliente_id, discriminacao, valor_servicos, aliquota, item_lista_servico)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(usuario_id)
        .bind(cliente_id)
        .bind(discriminacao)
        .bind(valor_servicos)
        .bind(aliquota)
        .bind(item_lista_servico)
        .fetch_one(&mut *tx)
        .await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE notas_fiscais SET referencia = 'nf_' || id WHERE id = $1 RETURNING {}",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(invoice)
    }

    pub async fn apply_provider_update(&self, id: i32, update: &InvoiceProviderUpdate) -> Result<Invoice, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE notas_fiscais SET
                status = $2,
                numero = COALESCE($3, numero),
                codigo_verificacao = COALESCE($4, codigo_verificacao),
                url_pdf = COALESCE($5, url_pdf),
                url_xml = COALESCE($6, url_xml),
                mensagem_erro = $7,
                data_emissao = COALESCE($8, data_emissao),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.numero.as_deref())
        .bind(update.codigo_verificacao.as_deref())
        .bind(update.url_pdf.as_deref())
        .bind(update.url_xml.as_deref())
        .bind(update.mensagem_erro.as_deref())
        .bind(update.data_emissao)
        .fetch_one(&self.pool)
        .await?;
        Ok(invoice)
    }

    /// Registra a mensagem do provedor; `status = None` mantém o status atual.
    pub async fn record_error(&self, id: i32, status: Option<InvoiceStatus>, mensagem: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE notas_fiscais SET
                status = COALESCE($2, status),
                mensagem_erro = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(mensagem)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(&self, usuario_id: i32) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM notas_fiscais WHERE usuario_id = $1 ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    pub async fn find(&self, id: i32, usuario_id: i32) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM notas_fiscais WHERE id = $1 AND usuario_id = $2",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }

    pub async fn delete(&self, id: i32, usuario_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notas_fiscais WHERE id = $1 AND usuario_id = $2")
            .bind(id)
            .bind(usuario_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
