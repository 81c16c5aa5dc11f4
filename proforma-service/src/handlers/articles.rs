//! Article catalog endpoints.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use proforma_core::error::AppError;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Article, ArticleForm};
use crate::startup::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<Article>> {
    let articles = match state.store.list_articles().await {
        Ok(articles) => articles,
        Err(e) => {
            warn!(error = %e, "article list unavailable, serving empty");
            Vec::new()
        }
    };
    Json(articles)
}

pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<ArticleForm>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    form.validate()?;
    let article = state.store.insert_article(&form).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ArticleForm>,
) -> Result<Json<Article>, AppError> {
    form.validate()?;
    state
        .store
        .update_article(id, &form)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow!("article {} not found", id)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_article(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
