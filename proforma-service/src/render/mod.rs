//! Printable proforma document rendering.
//!
//! Produces a self-contained, print-ready HTML page: company block, client
//! block, QR payment code, line-item table and totals. Totals arrive
//! pre-computed on the proforma header; nothing is derived here.

use anyhow::anyhow;
use askama::Template;
use chrono::NaiveDate;
use proforma_core::error::AppError;
use qrcode::render::svg;
use qrcode::QrCode;
use rust_decimal::Decimal;

use crate::models::{Client, CompanySettings, LineItem, Proforma};
use crate::services::metrics::DOCUMENTS_RENDERED_TOTAL;

/// Everything the renderer needs, fully resolved by the caller.
#[derive(Debug, Clone)]
pub struct ProformaDocument {
    pub company: CompanySettings,
    pub client: Client,
    pub proforma: Proforma,
    pub items: Vec<LineItem>,
}

#[derive(Template)]
#[template(path = "proforma.html")]
struct ProformaTemplate {
    company_name: String,
    company_activity: String,
    company_phones: String,
    company_cip: String,
    company_cip_expiry: String,
    company_ifu: String,
    company_email: String,
    company_rccm: String,
    manager_name: String,
    client_name: String,
    client_phone: String,
    client_email: String,
    client_address: String,
    invoice_number: String,
    date: String,
    qr_svg: String,
    rows: Vec<Row>,
    subtotal: String,
    tax_label: String,
    tax_amount: String,
    total: String,
    payment_terms: String,
}

struct Row {
    index: usize,
    designation: String,
    quantity: String,
    unit_price: String,
    amount: String,
}

/// Render a proforma to printable HTML.
pub fn render_document(doc: &ProformaDocument) -> Result<String, AppError> {
    let qr_svg = if doc.company.qr_code_url.is_empty() {
        String::new()
    } else {
        qr_svg(&doc.company.qr_code_url)?
    };

    let rows = doc
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| Row {
            index: i + 1,
            designation: item.designation.clone(),
            quantity: format_number(item.quantity),
            unit_price: format_fcfa(item.unit_price),
            amount: format_fcfa(item.amount),
        })
        .collect();

    let template = ProformaTemplate {
        company_name: doc.company.name.clone(),
        company_activity: doc.company.activity.clone(),
        company_phones: doc.company.phones.clone(),
        company_cip: doc.company.cip.clone(),
        company_cip_expiry: doc
            .company
            .cip_expiry
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        company_ifu: doc.company.ifu.clone(),
        company_email: doc.company.email.clone(),
        company_rccm: doc.company.rccm.clone(),
        manager_name: doc.company.manager_name.clone(),
        client_name: doc.client.name.clone(),
        client_phone: doc.client.phone.clone(),
        client_email: doc.client.email.clone(),
        client_address: doc.client.address.clone(),
        invoice_number: doc.proforma.invoice_number.clone(),
        date: format_date_fr(doc.proforma.date),
        qr_svg,
        rows,
        subtotal: format_fcfa(doc.proforma.subtotal),
        tax_label: format!("TVA {}%", doc.proforma.tax_rate.normalize()),
        tax_amount: format_fcfa(doc.proforma.tax_amount),
        total: format_fcfa(doc.proforma.total),
        payment_terms: if doc.proforma.payment_terms.is_empty() {
            "Paiement à la livraison".to_string()
        } else {
            doc.proforma.payment_terms.clone()
        },
    };

    let html = template
        .render()
        .map_err(|e| AppError::RenderError(anyhow!("template rendering failed: {}", e)))?;

    DOCUMENTS_RENDERED_TOTAL.inc();
    Ok(html)
}

fn qr_svg(data: &str) -> Result<String, AppError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::RenderError(anyhow!("QR encoding failed: {}", e)))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(120, 120)
        .build())
}

/// Format a number the fr-FR way: groups of three digits separated by a
/// narrow no-break space, comma as the decimal separator, trailing zeros
/// trimmed.
pub fn format_number(value: Decimal) -> String {
    let normalized = value.normalize();
    let text = normalized.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if normalized.is_sign_negative() {
        out.push('-');
    }
    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('\u{202f}');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Monetary display: grouped digits with the FCFA suffix.
pub fn format_fcfa(value: Decimal) -> String {
    format!("{} FCFA", format_number(value))
}

const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Long-form French date, e.g. "15 janvier 2026".
pub fn format_date_fr(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{} {} {}",
        date.day(),
        FRENCH_MONTHS[date.month0() as usize],
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::models::Discount;

    #[test]
    fn numbers_are_grouped_in_threes() {
        assert_eq!(format_number(dec!(0)), "0");
        assert_eq!(format_number(dec!(950)), "950");
        assert_eq!(format_number(dec!(6500)), "6\u{202f}500");
        assert_eq!(format_number(dec!(1234567)), "1\u{202f}234\u{202f}567");
    }

    #[test]
    fn fractions_use_a_comma_and_drop_trailing_zeros() {
        assert_eq!(format_number(dec!(1234.50)), "1\u{202f}234,5");
        assert_eq!(format_number(dec!(100.00)), "100");
    }

    #[test]
    fn money_carries_the_fcfa_suffix() {
        assert_eq!(format_fcfa(dec!(65000)), "65\u{202f}000 FCFA");
    }

    #[test]
    fn dates_render_in_long_french_form() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(format_date_fr(date), "15 janvier 2026");
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(format_date_fr(date), "1 décembre 2025");
    }

    fn sample_document() -> ProformaDocument {
        let items = vec![LineItem::computed(
            "Ciment CPJ 35".to_string(),
            dec!(10),
            dec!(6500),
            Discount::None,
        )];
        let totals = crate::models::compute_totals(&items, false);
        ProformaDocument {
            company: CompanySettings {
                id: Uuid::new_v4(),
                name: "Ets La Référence".to_string(),
                activity: "Matériaux de construction".to_string(),
                phones: "+229 97 00 00 00".to_string(),
                cip: "1234567890".to_string(),
                cip_expiry: NaiveDate::from_ymd_opt(2027, 6, 30),
                ifu: "0202300000000".to_string(),
                email: "contact@lareference.bj".to_string(),
                rccm: "RB/COT/23 A 12345".to_string(),
                manager_name: "A. HOUNSOU".to_string(),
                qr_code_url: "https://pay.example/lareference".to_string(),
            },
            client: Client {
                id: Uuid::new_v4(),
                name: "SOGEA BENIN".to_string(),
                phone: "+229 21 00 00 00".to_string(),
                email: "achats@sogea.bj".to_string(),
                address: "Zone portuaire, Cotonou".to_string(),
                created_utc: Utc::now(),
            },
            proforma: Proforma {
                id: Uuid::new_v4(),
                invoice_number: "00017".to_string(),
                client_id: None,
                client_name: "SOGEA BENIN".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
                subtotal: totals.subtotal,
                tax_rate: totals.tax_rate,
                tax_amount: totals.tax_amount,
                total: totals.total,
                payment_terms: String::new(),
                created_utc: Utc::now(),
            },
            items,
        }
    }

    #[test]
    fn document_embeds_company_client_and_totals() {
        let html = render_document(&sample_document()).unwrap();
        assert!(html.contains("FACTURE PRO FORMA"));
        assert!(html.contains("Ets La Référence"));
        assert!(html.contains("SOGEA BENIN"));
        assert!(html.contains("00017"));
        assert!(html.contains("Ciment CPJ 35"));
        assert!(html.contains("65\u{202f}000 FCFA"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn tax_line_shows_zero_when_untaxed() {
        let html = render_document(&sample_document()).unwrap();
        assert!(html.contains("TVA 0%"));
        assert!(html.contains("0 FCFA"));
    }

    #[test]
    fn missing_qr_url_renders_without_qr() {
        let mut doc = sample_document();
        doc.company.qr_code_url.clear();
        let html = render_document(&doc).unwrap();
        assert!(!html.contains("<svg"));
    }
}
