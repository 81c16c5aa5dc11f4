//! Client and article CRUD plus dashboard aggregates.

mod common;

use axum::http::StatusCode;
use common::{dec_field, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn clients_crud_and_name_ordering() {
    let app = TestApp::new();
    app.seed_client("Zinsou BTP").await;
    let id = app.seed_client("Atelier Koffi").await;

    let (status, list) = app.request("GET", "/api/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Atelier Koffi", "Zinsou BTP"]);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/clients/{}", id),
            Some(json!({"name": "Atelier Koffi & Fils", "phone": "+229 96 00 00 01"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Atelier Koffi & Fils");
    assert_eq!(updated["phone"], "+229 96 00 00 01");

    let (status, _) = app
        .request("DELETE", &format!("/api/clients/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = app.request("GET", "/api/clients", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn client_name_is_required() {
    let app = TestApp::new();
    let (status, _) = app
        .request("POST", "/api/clients", Some(json!({"name": ""})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn articles_crud_and_validation() {
    let app = TestApp::new();

    let (status, article) = app
        .request(
            "POST",
            "/api/articles",
            Some(json!({"designation": "Ciment 50kg", "unit_price": 6500})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = article["id"].as_str().unwrap().to_string();
    assert_eq!(dec_field(&article, "unit_price"), dec!(6500));

    // Negative prices never enter the catalog.
    let (status, _) = app
        .request(
            "POST",
            "/api/articles",
            Some(json!({"designation": "Remise fantôme", "unit_price": -5})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/articles/{}", id),
            Some(json!({"designation": "Ciment 50kg", "unit_price": 7000})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&updated, "unit_price"), dec!(7000));

    let (status, _) = app
        .request("DELETE", &format!("/api/articles/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = app.request("GET", "/api/articles", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn settings_upsert_is_idempotent_on_identity() {
    let app = TestApp::new();

    let (_, none) = app.request("GET", "/api/settings", None).await;
    assert!(none.is_null());

    let (status, first) = app
        .request("PUT", "/api/settings", Some(json!({"name": "BTP SARL"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first_id = first["id"].as_str().unwrap().to_string();

    let (status, second) = app
        .request(
            "PUT",
            "/api/settings",
            Some(json!({"name": "BTP SARL", "ifu": "3202012345678"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"].as_str().unwrap(), first_id);
    assert_eq!(second["ifu"], "3202012345678");
}

#[tokio::test]
async fn dashboard_counts_and_revenue() {
    let app = TestApp::new();

    let (_, empty) = app.request("GET", "/api/dashboard", None).await;
    assert_eq!(empty["clients"], 0);
    assert_eq!(dec_field(&empty, "proforma_total"), dec!(0));

    let client_id = app.seed_client("Entreprise Sogbo").await;
    app.request(
        "POST",
        "/api/articles",
        Some(json!({"designation": "Ciment 50kg", "unit_price": 6500})),
    )
    .await;

    for (number, price) in [("00001", 10000), ("00002", 2500)] {
        let (status, _) = app
            .request(
                "POST",
                "/api/proformas",
                Some(json!({
                    "invoice_number": number,
                    "client_id": client_id,
                    "date": "2026-02-01",
                    "items": [{"designation": "Prestation", "quantity": 1, "unit_price": price}]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = app.request("GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["clients"], 1);
    assert_eq!(stats["articles"], 1);
    assert_eq!(stats["proformas"], 2);
    assert_eq!(dec_field(&stats, "proforma_total"), dec!(12500));
}
