//! Proforma endpoints: listing, save, load, delete, numbering and the
//! printable document.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::NaiveDate;
use proforma_core::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::draft::ProformaDraft;
use crate::models::{Discount, LineItem, Proforma};
use crate::render::render_document;
use crate::services::ProformaService;
use crate::startup::AppState;

/// Save payload for both create and update. Line amounts are absent on
/// purpose: the server derives every amount itself.
#[derive(Debug, Deserialize)]
pub struct ProformaPayload {
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(default)]
    pub has_tax: bool,
    #[serde(default)]
    pub payment_terms: String,
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemInput {
    pub designation: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Discount,
}

impl ProformaPayload {
    fn into_draft(self) -> ProformaDraft {
        let items = self
            .items
            .into_iter()
            .map(|i| LineItem::computed(i.designation, i.quantity, i.unit_price, i.discount))
            .collect();
        ProformaDraft::from_parts(
            self.invoice_number,
            self.client_id,
            self.date,
            self.has_tax,
            self.payment_terms,
            items,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ProformaWithItems {
    #[serde(flatten)]
    pub proforma: Proforma,
    pub items: Vec<LineItem>,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Proforma>> {
    let proformas = match state.store.list_proformas().await {
        Ok(proformas) => proformas,
        Err(e) => {
            warn!(error = %e, "proforma list unavailable, serving empty");
            Vec::new()
        }
    };
    Json(proformas)
}

pub async fn next_number(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let number = ProformaService::new(state.store.clone()).next_number().await?;
    Ok(Json(json!({ "invoice_number": number })))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProformaWithItems>, AppError> {
    let (proforma, items) = ProformaService::new(state.store.clone()).load(id).await?;
    Ok(Json(ProformaWithItems { proforma, items }))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProformaPayload>,
) -> Result<(StatusCode, Json<Proforma>), AppError> {
    let draft = payload.into_draft();
    let saved = ProformaService::new(state.store.clone())
        .create(&draft)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProformaPayload>,
) -> Result<Json<Proforma>, AppError> {
    let draft = payload.into_draft();
    let saved = ProformaService::new(state.store.clone())
        .update(id, &draft)
        .await?;
    Ok(Json(saved))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ProformaService::new(state.store.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let doc = ProformaService::new(state.store.clone())
        .document(id)
        .await?;
    Ok(Html(render_document(&doc)?))
}
