//! Router assembly and shared application state.

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{articles, clients, dashboard, health, proformas, settings};
use crate::services::metrics::HTTP_REQUESTS_TOTAL;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            put(clients::update).delete(clients::remove),
        )
        .route("/api/articles", get(articles::list).post(articles::create))
        .route(
            "/api/articles/:id",
            put(articles::update).delete(articles::remove),
        )
        .route(
            "/api/proformas",
            get(proformas::list).post(proformas::create),
        )
        .route("/api/proformas/next-number", get(proformas::next_number))
        .route(
            "/api/proformas/:id",
            get(proformas::show)
                .put(proformas::update)
                .delete(proformas::remove),
        )
        .route("/api/proformas/:id/document", get(proformas::document))
        .route("/api/settings", get(settings::show).put(settings::save))
        .route("/api/dashboard", get(dashboard::stats))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Count every request against its matched route template, so path
/// parameters don't explode the label space.
async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();
    response
}
