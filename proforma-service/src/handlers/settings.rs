//! Company settings endpoints.

use axum::{extract::State, Json};
use proforma_core::error::AppError;
use tracing::warn;
use validator::Validate;

use crate::models::{CompanySettings, SettingsForm};
use crate::startup::AppState;

pub async fn show(State(state): State<AppState>) -> Json<Option<CompanySettings>> {
    let settings = match state.store.get_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "settings unavailable, serving none");
            None
        }
    };
    Json(settings)
}

pub async fn save(
    State(state): State<AppState>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<CompanySettings>, AppError> {
    form.validate()?;
    let saved = state.store.upsert_settings(&form).await?;
    Ok(Json(saved))
}
