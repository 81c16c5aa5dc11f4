//! Dashboard aggregates.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub clients: i64,
    pub articles: i64,
    pub proformas: i64,
    pub proforma_total: Decimal,
}

/// Each counter degrades to zero independently; one failing table never
/// blanks the whole dashboard.
pub async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let clients = state.store.count_clients().await.unwrap_or_else(|e| {
        warn!(error = %e, "client count unavailable");
        0
    });
    let articles = state.store.count_articles().await.unwrap_or_else(|e| {
        warn!(error = %e, "article count unavailable");
        0
    });
    let proformas = state.store.count_proformas().await.unwrap_or_else(|e| {
        warn!(error = %e, "proforma count unavailable");
        0
    });
    let proforma_total = state
        .store
        .sum_proforma_totals()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "proforma total unavailable");
            Decimal::ZERO
        });

    Json(DashboardStats {
        clients,
        articles,
        proformas,
        proforma_total,
    })
}
