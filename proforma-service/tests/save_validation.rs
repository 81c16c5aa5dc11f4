//! Save-time validation: nothing is persisted when a check fails.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn assert_rejected(app: &TestApp, payload: serde_json::Value, fragment: &str) {
    let (status, body) = app.request("POST", "/api/proformas", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"].as_str().unwrap().contains(fragment),
        "unexpected error body: {}",
        body
    );
}

#[tokio::test]
async fn invalid_saves_are_rejected_and_leave_no_rows() {
    let app = TestApp::new();
    let client_id = app.seed_client("Client Unique").await;

    // No client selected.
    assert_rejected(
        &app,
        json!({
            "invoice_number": "00001",
            "client_id": null,
            "date": "2026-02-01",
            "items": [{"designation": "Ciment", "quantity": 1, "unit_price": 100}]
        }),
        "client must be selected",
    )
    .await;

    // Blank invoice number.
    assert_rejected(
        &app,
        json!({
            "invoice_number": "   ",
            "client_id": client_id,
            "date": "2026-02-01",
            "items": [{"designation": "Ciment", "quantity": 1, "unit_price": 100}]
        }),
        "invoice number",
    )
    .await;

    // No line items at all.
    assert_rejected(
        &app,
        json!({
            "invoice_number": "00001",
            "client_id": client_id,
            "date": "2026-02-01",
            "items": []
        }),
        "at least one line item",
    )
    .await;

    // A line without a designation.
    assert_rejected(
        &app,
        json!({
            "invoice_number": "00001",
            "client_id": client_id,
            "date": "2026-02-01",
            "items": [
                {"designation": "Ciment", "quantity": 1, "unit_price": 100},
                {"designation": "  ", "quantity": 2, "unit_price": 50}
            ]
        }),
        "designation",
    )
    .await;

    // A client id that no longer resolves.
    assert_rejected(
        &app,
        json!({
            "invoice_number": "00001",
            "client_id": "3c9f1a77-8f21-4f35-93d3-6f8a1c2e9b44",
            "date": "2026-02-01",
            "items": [{"designation": "Ciment", "quantity": 1, "unit_price": 100}]
        }),
        "client no longer exists",
    )
    .await;

    let (_, list) = app.request("GET", "/api/proformas", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn client_side_amounts_are_never_trusted() {
    let app = TestApp::new();
    let client_id = app.seed_client("Client Honnête").await;

    // The payload claims an absurd amount; the server re-derives it.
    let (status, created) = app
        .request(
            "POST",
            "/api/proformas",
            Some(json!({
                "invoice_number": "00001",
                "client_id": client_id,
                "date": "2026-02-01",
                "items": [{
                    "designation": "Ciment",
                    "quantity": 2,
                    "unit_price": 1500,
                    "amount": 1
                }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(common::dec_field(&created, "subtotal"), rust_decimal_macros::dec!(3000));
}
