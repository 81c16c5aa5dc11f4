//! In-memory store backend, used by tests and the `memory` backend switch.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use proforma_core::error::AppError;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Article, ArticleForm, Client, ClientForm, CompanySettings, LineItem, NewProforma, Proforma,
    SettingsForm,
};

use super::Store;

#[derive(Default)]
struct Tables {
    clients: Vec<Client>,
    articles: Vec<Article>,
    /// Push order doubles as creation order.
    proformas: Vec<Proforma>,
    items: HashMap<Uuid, Vec<LineItem>>,
    settings: Option<CompanySettings>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let tables = self.tables.read().await;
        let mut clients = tables.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_client(&self, form: &ClientForm) -> Result<Client, AppError> {
        let client = Client {
            id: Uuid::new_v4(),
            name: form.name.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
            address: form.address.clone(),
            created_utc: Utc::now(),
        };
        self.tables.write().await.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(
        &self,
        id: Uuid,
        form: &ClientForm,
    ) -> Result<Option<Client>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(client) = tables.clients.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        client.name = form.name.clone();
        client.phone = form.phone.clone();
        client.email = form.email.clone();
        client.address = form.address.clone();
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.clients.retain(|c| c.id != id);
        // Mirror the SQL `ON DELETE SET NULL`: the denormalized name stays.
        for proforma in &mut tables.proformas {
            if proforma.client_id == Some(id) {
                proforma.client_id = None;
            }
        }
        Ok(())
    }

    async fn count_clients(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.clients.len() as i64)
    }

    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        let tables = self.tables.read().await;
        let mut articles = tables.articles.clone();
        articles.sort_by(|a, b| a.designation.cmp(&b.designation));
        Ok(articles)
    }

    async fn insert_article(&self, form: &ArticleForm) -> Result<Article, AppError> {
        let article = Article {
            id: Uuid::new_v4(),
            designation: form.designation.clone(),
            unit_price: form.unit_price,
            created_utc: Utc::now(),
        };
        self.tables.write().await.articles.push(article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: Uuid,
        form: &ArticleForm,
    ) -> Result<Option<Article>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(article) = tables.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        article.designation = form.designation.clone();
        article.unit_price = form.unit_price;
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.articles.retain(|a| a.id != id);
        Ok(())
    }

    async fn count_articles(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.articles.len() as i64)
    }

    async fn list_proformas(&self) -> Result<Vec<Proforma>, AppError> {
        let tables = self.tables.read().await;
        let mut proformas = tables.proformas.clone();
        proformas.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_utc.cmp(&a.created_utc))
        });
        Ok(proformas)
    }

    async fn get_proforma(&self, id: Uuid) -> Result<Option<Proforma>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.proformas.iter().find(|p| p.id == id).cloned())
    }

    async fn latest_invoice_number(&self) -> Result<Option<String>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.proformas.last().map(|p| p.invoice_number.clone()))
    }

    async fn insert_proforma(&self, new: &NewProforma) -> Result<Proforma, AppError> {
        let proforma = Proforma {
            id: Uuid::new_v4(),
            invoice_number: new.invoice_number.clone(),
            client_id: new.client_id,
            client_name: new.client_name.clone(),
            date: new.date,
            subtotal: new.subtotal,
            tax_rate: new.tax_rate,
            tax_amount: new.tax_amount,
            total: new.total,
            payment_terms: new.payment_terms.clone(),
            created_utc: Utc::now(),
        };
        self.tables.write().await.proformas.push(proforma.clone());
        Ok(proforma)
    }

    async fn update_proforma(
        &self,
        id: Uuid,
        new: &NewProforma,
    ) -> Result<Option<Proforma>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(proforma) = tables.proformas.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        proforma.invoice_number = new.invoice_number.clone();
        proforma.client_id = new.client_id;
        proforma.client_name = new.client_name.clone();
        proforma.date = new.date;
        proforma.subtotal = new.subtotal;
        proforma.tax_rate = new.tax_rate;
        proforma.tax_amount = new.tax_amount;
        proforma.total = new.total;
        proforma.payment_terms = new.payment_terms.clone();
        Ok(Some(proforma.clone()))
    }

    async fn delete_proforma(&self, id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.proformas.retain(|p| p.id != id);
        Ok(())
    }

    async fn count_proformas(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.proformas.len() as i64)
    }

    async fn sum_proforma_totals(&self) -> Result<Decimal, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.proformas.iter().map(|p| p.total).sum())
    }

    async fn list_items(&self, proforma_id: Uuid) -> Result<Vec<LineItem>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&proforma_id).cloned().unwrap_or_default())
    }

    async fn insert_items(&self, proforma_id: Uuid, items: &[LineItem]) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .items
            .entry(proforma_id)
            .or_default()
            .extend_from_slice(items);
        Ok(())
    }

    async fn delete_items(&self, proforma_id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.items.remove(&proforma_id);
        Ok(())
    }

    async fn get_settings(&self) -> Result<Option<CompanySettings>, AppError> {
        Ok(self.tables.read().await.settings.clone())
    }

    async fn upsert_settings(&self, form: &SettingsForm) -> Result<CompanySettings, AppError> {
        let mut tables = self.tables.write().await;
        let id = tables
            .settings
            .as_ref()
            .map(|s| s.id)
            .unwrap_or_else(Uuid::new_v4);
        let settings = CompanySettings {
            id,
            name: form.name.clone(),
            activity: form.activity.clone(),
            phones: form.phones.clone(),
            cip: form.cip.clone(),
            cip_expiry: form.cip_expiry,
            ifu: form.ifu.clone(),
            email: form.email.clone(),
            rccm: form.rccm.clone(),
            manager_name: form.manager_name.clone(),
            qr_code_url: form.qr_code_url.clone(),
        };
        tables.settings = Some(settings.clone());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn header(number: &str, date: NaiveDate) -> NewProforma {
        NewProforma {
            invoice_number: number.to_string(),
            client_id: None,
            client_name: "Client".to_string(),
            date,
            subtotal: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total: Decimal::ZERO,
            payment_terms: String::new(),
        }
    }

    #[tokio::test]
    async fn same_date_proformas_list_newest_creation_first() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();

        store.insert_proforma(&header("00001", date)).await.unwrap();
        store.insert_proforma(&header("00002", date)).await.unwrap();
        store.insert_proforma(&header("00003", earlier)).await.unwrap();

        let listed = store.list_proformas().await.unwrap();
        let numbers: Vec<_> = listed.iter().map(|p| p.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["00002", "00001", "00003"]);
    }
}
