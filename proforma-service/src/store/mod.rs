//! Store abstraction over the persistence backend.
//!
//! All durable CRUD goes through the [`Store`] trait: Postgres in
//! production ([`PgStore`]), an in-memory table set ([`MemoryStore`]) for
//! tests and local development. Store calls carry no transaction or
//! ordering guarantee beyond the caller sequencing them.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use proforma_core::error::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    Article, ArticleForm, Client, ClientForm, CompanySettings, LineItem, NewProforma, Proforma,
    SettingsForm,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    // Clients
    /// Ordered by name for pickers and lists.
    async fn list_clients(&self) -> Result<Vec<Client>, AppError>;
    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError>;
    async fn insert_client(&self, form: &ClientForm) -> Result<Client, AppError>;
    async fn update_client(&self, id: Uuid, form: &ClientForm)
        -> Result<Option<Client>, AppError>;
    async fn delete_client(&self, id: Uuid) -> Result<(), AppError>;
    async fn count_clients(&self) -> Result<i64, AppError>;

    // Articles
    /// Ordered by designation.
    async fn list_articles(&self) -> Result<Vec<Article>, AppError>;
    async fn insert_article(&self, form: &ArticleForm) -> Result<Article, AppError>;
    async fn update_article(
        &self,
        id: Uuid,
        form: &ArticleForm,
    ) -> Result<Option<Article>, AppError>;
    async fn delete_article(&self, id: Uuid) -> Result<(), AppError>;
    async fn count_articles(&self) -> Result<i64, AppError>;

    // Proformas
    /// Ordered by date, most recent first.
    async fn list_proformas(&self) -> Result<Vec<Proforma>, AppError>;
    async fn get_proforma(&self, id: Uuid) -> Result<Option<Proforma>, AppError>;
    /// Invoice number of the most recently created proforma, if any.
    async fn latest_invoice_number(&self) -> Result<Option<String>, AppError>;
    async fn insert_proforma(&self, new: &NewProforma) -> Result<Proforma, AppError>;
    async fn update_proforma(
        &self,
        id: Uuid,
        new: &NewProforma,
    ) -> Result<Option<Proforma>, AppError>;
    async fn delete_proforma(&self, id: Uuid) -> Result<(), AppError>;
    async fn count_proformas(&self) -> Result<i64, AppError>;
    /// Sum of all proforma grand totals, for the dashboard.
    async fn sum_proforma_totals(&self) -> Result<Decimal, AppError>;

    // Line items
    async fn list_items(&self, proforma_id: Uuid) -> Result<Vec<LineItem>, AppError>;
    async fn insert_items(&self, proforma_id: Uuid, items: &[LineItem]) -> Result<(), AppError>;
    async fn delete_items(&self, proforma_id: Uuid) -> Result<(), AppError>;

    // Company settings (singleton)
    async fn get_settings(&self) -> Result<Option<CompanySettings>, AppError>;
    /// Insert on first save, update in place afterwards.
    async fn upsert_settings(&self, form: &SettingsForm) -> Result<CompanySettings, AppError>;
}
