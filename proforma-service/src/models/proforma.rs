//! Proforma invoice model and the line-item totals engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tax percentage applied when a proforma is taxed (VAT).
pub const TAX_RATE_PERCENT: u32 = 18;

/// Discount policy for one line. A closed variant: an invalid kind/value
/// combination is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    #[default]
    None,
    Percentage(Decimal),
    Amount(Decimal),
}

impl Discount {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discount::None => "none",
            Discount::Percentage(_) => "percentage",
            Discount::Amount(_) => "amount",
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Discount::None => Decimal::ZERO,
            Discount::Percentage(v) | Discount::Amount(v) => *v,
        }
    }

    pub fn from_parts(kind: &str, value: Decimal) -> Self {
        match kind {
            "percentage" => Discount::Percentage(value),
            "amount" => Discount::Amount(value),
            _ => Discount::None,
        }
    }

    /// Apply this discount to a line base of `quantity × unit_price`.
    ///
    /// The result is floored at zero: a discount may never drive a line
    /// negative. Percentages above 100 are accepted and clamp to zero
    /// through the same floor.
    pub fn apply(&self, base: Decimal) -> Decimal {
        let discounted = match self {
            Discount::None => base,
            Discount::Percentage(v) => base - base * *v / Decimal::from(100),
            Discount::Amount(v) => base - *v,
        };
        discounted.max(Decimal::ZERO)
    }
}

/// One billable row on a proforma.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub designation: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Discount,
    /// Derived from the other fields; never edited directly.
    pub amount: Decimal,
}

impl LineItem {
    /// A blank row, the shape a new draft line starts in.
    pub fn blank() -> Self {
        Self {
            designation: String::new(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            discount: Discount::None,
            amount: Decimal::ZERO,
        }
    }

    /// Build a line with its amount already derived.
    pub fn computed(
        designation: String,
        quantity: Decimal,
        unit_price: Decimal,
        discount: Discount,
    ) -> Self {
        let mut item = Self {
            designation,
            quantity,
            unit_price,
            discount,
            amount: Decimal::ZERO,
        };
        item.recompute();
        item
    }

    /// Re-derive `amount`. Must run after every change to quantity, unit
    /// price or discount so a stale amount is never observable.
    pub fn recompute(&mut self) {
        self.amount = self.discount.apply(self.quantity * self.unit_price);
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::blank()
    }
}

/// Aggregate totals over a line list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Derive subtotal, tax and grand total from the current lines.
///
/// Always computed from scratch, never cached: callers re-run this on every
/// line edit and on toggling the tax flag.
pub fn compute_totals(items: &[LineItem], has_tax: bool) -> Totals {
    let subtotal: Decimal = items.iter().map(|i| i.amount).sum();
    let tax_rate = if has_tax {
        Decimal::from(TAX_RATE_PERCENT)
    } else {
        Decimal::ZERO
    };
    let tax_amount = subtotal * tax_rate / Decimal::from(100);
    Totals {
        subtotal,
        tax_rate,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// Persisted proforma header. The three derived fields (subtotal, tax
/// amount, total) are always written together from [`compute_totals`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Proforma {
    pub id: Uuid,
    pub invoice_number: String,
    /// Cleared if the client is later removed.
    pub client_id: Option<Uuid>,
    /// Snapshot of the client name at save time. Kept independent of the
    /// live client record so historical proformas remain readable.
    pub client_name: String,
    pub date: NaiveDate,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub payment_terms: String,
    pub created_utc: DateTime<Utc>,
}

/// Header fields for an insert or full update; the store assigns identity
/// and creation time.
#[derive(Debug, Clone)]
pub struct NewProforma {
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub date: NaiveDate,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub payment_terms: String,
}
