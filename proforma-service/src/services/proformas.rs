//! Proforma save/load orchestration against the store.

use anyhow::anyhow;
use proforma_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::draft::ProformaDraft;
use crate::models::{LineItem, NewProforma, Proforma};
use crate::render::ProformaDocument;
use crate::services::metrics::PROFORMAS_SAVED_TOTAL;
use crate::services::numbering::next_invoice_number;
use crate::store::SharedStore;

pub struct ProformaService {
    store: SharedStore,
}

impl ProformaService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Suggest the invoice number for a fresh draft: read the most recent
    /// number and bump it.
    pub async fn next_number(&self) -> Result<String, AppError> {
        let latest = self.store.latest_invoice_number().await?;
        Ok(next_invoice_number(latest.as_deref()))
    }

    /// Validate and persist a new proforma: header first, then its items
    /// tagged with the new identity.
    #[instrument(skip(self, draft), fields(invoice_number = %draft.invoice_number))]
    pub async fn create(&self, draft: &ProformaDraft) -> Result<Proforma, AppError> {
        let new = self.validate(draft).await?;
        let header = self.store.insert_proforma(&new).await?;
        self.store.insert_items(header.id, draft.items()).await?;

        PROFORMAS_SAVED_TOTAL.with_label_values(&["create"]).inc();
        info!(proforma_id = %header.id, total = %header.total, "Proforma saved");
        Ok(header)
    }

    /// Validate and persist over an existing proforma. The previous item
    /// set is fully replaced: update the header, delete the old items,
    /// reinsert the draft's items — in that strict sequence. The three
    /// store calls are not wrapped in a transaction; a failure between
    /// delete and reinsert leaves the proforma without items (known risk,
    /// see DESIGN.md).
    #[instrument(skip(self, draft), fields(proforma_id = %id))]
    pub async fn update(&self, id: Uuid, draft: &ProformaDraft) -> Result<Proforma, AppError> {
        let new = self.validate(draft).await?;
        let header = self
            .store
            .update_proforma(id, &new)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("proforma {} not found", id)))?;
        self.store.delete_items(id).await?;
        self.store.insert_items(id, draft.items()).await?;

        PROFORMAS_SAVED_TOTAL.with_label_values(&["update"]).inc();
        info!(total = %header.total, "Proforma updated");
        Ok(header)
    }

    /// Load a persisted proforma together with its items.
    pub async fn load(&self, id: Uuid) -> Result<(Proforma, Vec<LineItem>), AppError> {
        let header = self
            .store
            .get_proforma(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("proforma {} not found", id)))?;
        let items = self.store.list_items(id).await?;
        Ok((header, items))
    }

    /// Delete a proforma and its items.
    #[instrument(skip(self), fields(proforma_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_items(id).await?;
        self.store.delete_proforma(id).await
    }

    /// Gather everything the document renderer needs. Refuses with a
    /// dependency-missing error when the client or the company settings
    /// are absent; no partial document is ever produced.
    pub async fn document(&self, id: Uuid) -> Result<ProformaDocument, AppError> {
        let (header, items) = self.load(id).await?;

        let company = self.store.get_settings().await?.ok_or_else(|| {
            AppError::MissingDependency("company settings are not configured".to_string())
        })?;

        let client = match header.client_id {
            Some(client_id) => self.store.get_client(client_id).await?,
            None => None,
        }
        .ok_or_else(|| {
            AppError::MissingDependency("the proforma's client no longer exists".to_string())
        })?;

        Ok(ProformaDocument {
            company,
            client,
            proforma: header,
            items,
        })
    }

    /// Check the draft and derive the header to persist. All checks run
    /// before any write is attempted; on failure nothing is persisted.
    async fn validate(&self, draft: &ProformaDraft) -> Result<NewProforma, AppError> {
        if draft.invoice_number.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow!("invoice number is required")));
        }
        let Some(client_id) = draft.client_id else {
            return Err(AppError::BadRequest(anyhow!("a client must be selected")));
        };
        if draft.items().is_empty() {
            return Err(AppError::BadRequest(anyhow!(
                "a proforma needs at least one line item"
            )));
        }
        if draft
            .items()
            .iter()
            .any(|i| i.designation.trim().is_empty())
        {
            return Err(AppError::BadRequest(anyhow!(
                "every line item needs a designation"
            )));
        }

        let client = self
            .store
            .get_client(client_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow!("selected client no longer exists")))?;

        let totals = draft.totals();
        Ok(NewProforma {
            invoice_number: draft.invoice_number.clone(),
            client_id: Some(client_id),
            client_name: client.name,
            date: draft.date,
            subtotal: totals.subtotal,
            tax_rate: totals.tax_rate,
            tax_amount: totals.tax_amount,
            total: totals.total,
            payment_terms: draft.payment_terms.clone(),
        })
    }
}
