//! Domain models for proforma-service.

mod article;
mod client;
mod proforma;
mod settings;

pub use article::{Article, ArticleForm};
pub use client::{Client, ClientForm};
pub use proforma::{
    compute_totals, Discount, LineItem, NewProforma, Proforma, Totals, TAX_RATE_PERCENT,
};
pub use settings::{CompanySettings, SettingsForm};
