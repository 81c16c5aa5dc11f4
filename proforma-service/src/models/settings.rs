//! Company settings model (singleton).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Identity of the issuing business, printed on rendered documents.
/// At most one row exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanySettings {
    pub id: Uuid,
    pub name: String,
    pub activity: String,
    pub phones: String,
    pub cip: String,
    pub cip_expiry: Option<NaiveDate>,
    pub ifu: String,
    pub email: String,
    pub rccm: String,
    pub manager_name: String,
    /// Payment-link payload encoded into the QR code on documents.
    pub qr_code_url: String,
}

/// Payload for the first save (insert) or any later save (update in place).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SettingsForm {
    #[validate(length(min = 1, message = "company name is required"))]
    pub name: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub phones: String,
    #[serde(default)]
    pub cip: String,
    #[serde(default)]
    pub cip_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub ifu: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rccm: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default)]
    pub qr_code_url: String,
}
