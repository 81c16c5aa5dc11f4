//! In-memory proforma draft.
//!
//! One draft is edited at a time by one actor. Every mutation that touches
//! a line re-derives that line's amount, and totals are computed fresh on
//! each read, so neither a line amount nor an aggregate total can go stale.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{compute_totals, Article, Discount, LineItem, Proforma, Totals};

/// A field edit applied to one draft line.
#[derive(Debug, Clone)]
pub enum ItemEdit {
    Designation(String),
    Quantity(Decimal),
    UnitPrice(Decimal),
    Discount(Discount),
}

/// An unsaved proforma being edited.
#[derive(Debug, Clone)]
pub struct ProformaDraft {
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    pub has_tax: bool,
    pub payment_terms: String,
    items: Vec<LineItem>,
}

impl ProformaDraft {
    /// Fresh draft with a single blank line, the state a new-proforma
    /// screen opens in.
    pub fn new(invoice_number: String, date: NaiveDate) -> Self {
        Self {
            invoice_number,
            client_id: None,
            date,
            has_tax: false,
            payment_terms: String::new(),
            items: vec![LineItem::blank()],
        }
    }

    /// Draft assembled from already-shaped parts (a save payload or a
    /// loaded proforma). Line amounts are re-derived, never trusted.
    pub fn from_parts(
        invoice_number: String,
        client_id: Option<Uuid>,
        date: NaiveDate,
        has_tax: bool,
        payment_terms: String,
        mut items: Vec<LineItem>,
    ) -> Self {
        for item in &mut items {
            item.recompute();
        }
        Self {
            invoice_number,
            client_id,
            date,
            has_tax,
            payment_terms,
            items,
        }
    }

    /// Reopen a persisted proforma for editing.
    pub fn from_saved(header: &Proforma, items: Vec<LineItem>) -> Self {
        Self::from_parts(
            header.invoice_number.clone(),
            header.client_id,
            header.date,
            header.tax_rate > Decimal::ZERO,
            header.payment_terms.clone(),
            items,
        )
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn add_item(&mut self) {
        self.items.push(LineItem::blank());
    }

    /// Remove a line. Returns false when the index is out of range.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }

    /// Apply one field edit and immediately re-derive the line's amount.
    pub fn edit_item(&mut self, index: usize, edit: ItemEdit) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        match edit {
            ItemEdit::Designation(d) => item.designation = d,
            ItemEdit::Quantity(q) => item.quantity = q,
            ItemEdit::UnitPrice(p) => item.unit_price = p,
            ItemEdit::Discount(d) => item.discount = d,
        }
        item.recompute();
        true
    }

    /// Pre-fill a line from a catalog article. The line stays independent
    /// of the article afterwards.
    pub fn apply_article(&mut self, index: usize, article: &Article) -> bool {
        self.edit_item(index, ItemEdit::Designation(article.designation.clone()))
            && self.edit_item(index, ItemEdit::UnitPrice(article.unit_price))
    }

    pub fn set_has_tax(&mut self, has_tax: bool) {
        self.has_tax = has_tax;
    }

    /// Current aggregate totals, derived from scratch on every call.
    pub fn totals(&self) -> Totals {
        compute_totals(&self.items, self.has_tax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn draft() -> ProformaDraft {
        ProformaDraft::new(
            "00001".to_string(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
    }

    #[test]
    fn new_draft_opens_with_one_blank_line() {
        let d = draft();
        assert_eq!(d.items().len(), 1);
        assert_eq!(d.items()[0].amount, Decimal::ZERO);
        assert_eq!(d.totals().total, Decimal::ZERO);
    }

    #[test]
    fn editing_a_line_rederives_its_amount() {
        let mut d = draft();
        d.edit_item(0, ItemEdit::Designation("Ciment".to_string()));
        d.edit_item(0, ItemEdit::Quantity(dec!(10)));
        d.edit_item(0, ItemEdit::UnitPrice(dec!(6500)));
        assert_eq!(d.items()[0].amount, dec!(65000));

        d.edit_item(0, ItemEdit::Discount(Discount::Percentage(dec!(10))));
        assert_eq!(d.items()[0].amount, dec!(58500));
        assert_eq!(d.totals().subtotal, dec!(58500));
    }

    #[test]
    fn edits_out_of_range_are_rejected() {
        let mut d = draft();
        assert!(!d.edit_item(5, ItemEdit::Quantity(dec!(1))));
        assert!(!d.remove_item(5));
    }

    #[test]
    fn add_and_remove_lines_update_totals() {
        let mut d = draft();
        d.edit_item(0, ItemEdit::UnitPrice(dec!(100)));
        d.add_item();
        d.edit_item(1, ItemEdit::Quantity(dec!(2)));
        d.edit_item(1, ItemEdit::UnitPrice(dec!(50)));
        assert_eq!(d.totals().subtotal, dec!(200));

        assert!(d.remove_item(0));
        assert_eq!(d.totals().subtotal, dec!(100));
    }

    #[test]
    fn tax_toggle_recomputes_aggregates() {
        let mut d = draft();
        d.edit_item(0, ItemEdit::UnitPrice(dec!(1000)));
        assert_eq!(d.totals().total, dec!(1000));

        d.set_has_tax(true);
        let totals = d.totals();
        assert_eq!(totals.tax_amount, dec!(180));
        assert_eq!(totals.total, dec!(1180));

        d.set_has_tax(false);
        assert_eq!(d.totals().tax_amount, Decimal::ZERO);
    }

    #[test]
    fn article_selection_prefills_the_line() {
        let article = Article {
            id: Uuid::new_v4(),
            designation: "Tôle bac alu".to_string(),
            unit_price: dec!(4200),
            created_utc: chrono::Utc::now(),
        };
        let mut d = draft();
        assert!(d.apply_article(0, &article));
        assert_eq!(d.items()[0].designation, "Tôle bac alu");
        assert_eq!(d.items()[0].amount, dec!(4200));
    }

    #[test]
    fn from_parts_rederives_tampered_amounts() {
        let mut item = LineItem::computed(
            "Sable".to_string(),
            dec!(2),
            dec!(1500),
            Discount::None,
        );
        item.amount = dec!(1);

        let d = ProformaDraft::from_parts(
            "00009".to_string(),
            None,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            false,
            String::new(),
            vec![item],
        );
        assert_eq!(d.items()[0].amount, dec!(3000));
    }
}
