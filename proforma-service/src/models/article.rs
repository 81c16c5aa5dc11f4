//! Catalog article model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A catalog article. Selecting one pre-fills a proforma line; the line
/// keeps no reference to the article afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub designation: String,
    pub unit_price: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Payload for creating or replacing an article.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ArticleForm {
    #[validate(length(min = 1, message = "designation is required"))]
    pub designation: String,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("unit price must not be negative"));
    }
    Ok(())
}
