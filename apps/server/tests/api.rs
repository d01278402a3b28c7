//! End-to-end API tests: drive the router in-process against an
//! in-memory database, no socket involved.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use caixa_core::Product;
use caixa_db::{Database, DbConfig};
use caixa_server::{routes, AppState, SessionState};

// =============================================================================
// Harness
// =============================================================================

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let now = Utc::now();
    let catalog = [
        ("7891234567890", "Coca-Cola 2L", 850, 50),
        ("7891234567891", "Pão Francês", 50, 3),
        ("7891234567892", "Arroz 5kg", 2290, 30),
    ];
    for (barcode, name, price_cents, stock) in catalog {
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                barcode: barcode.to_string(),
                name: name.to_string(),
                description: None,
                category: None,
                price_cents,
                stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    let state = AppState::new(db, SessionState::new(), "terminal-test");
    routes::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn barcode_lookup_finds_active_product() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/products/barcode/7891234567890", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], json!("Coca-Cola 2L"));
    assert_eq!(body["product"]["priceCents"], json!(850));
}

#[tokio::test]
async fn barcode_lookup_unknown_is_404() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/products/barcode/0000000000000", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("not_found"));
}

#[tokio::test]
async fn product_listing_sorted_by_name() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/products", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Arroz 5kg", "Coca-Cola 2L", "Pão Francês"]);
}

#[tokio::test]
async fn full_cash_sale_flow() {
    let app = test_app().await;

    // Scan two Coca-Colas.
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/cart/items",
            Some(json!({ "barcode": "7891234567890" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    let (_, cart) = send(&app, "GET", "/api/cart", None).await;
    assert_eq!(cart["cart"]["subtotalCents"], json!(1700));
    assert_eq!(cart["cart"]["totalQuantity"], json!(2));

    // Review: R$ 2.00 off, R$ 20.00 tendered.
    let (status, review) = send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({
            "discountCents": 200,
            "paymentMethod": "cash",
            "cashTenderedCents": 2000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["review"]["totals"]["totalCents"], json!(1500));
    assert_eq!(review["review"]["changeCents"], json!(500));

    // Commit.
    let (status, sale) = send(&app, "POST", "/api/sales", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["sale"]["saleNumber"], json!(1));
    assert_eq!(sale["sale"]["totalCents"], json!(1500));
    assert_eq!(sale["sale"]["changeCents"], json!(500));

    // Cart is empty again and stock went down.
    let (_, cart) = send(&app, "GET", "/api/cart", None).await;
    assert_eq!(cart["cart"]["lineCount"], json!(0));
    let (_, product) = send(&app, "GET", "/api/products/barcode/7891234567890", None).await;
    assert_eq!(product["product"]["stock"], json!(48));

    // And the sale shows up in history and the daily report.
    let (_, sales) = send(&app, "GET", "/api/sales?limit=10&page=1", None).await;
    assert_eq!(sales["total"], json!(1));

    let (_, report) = send(&app, "GET", "/api/reports/daily", None).await;
    assert_eq!(report["report"]["saleCount"], json!(1));
    assert_eq!(report["report"]["totalCents"], json!(1500));
    assert_eq!(
        report["report"]["byPaymentMethod"][0]["method"],
        json!("cash")
    );
}

#[tokio::test]
async fn commit_without_review_is_conflict() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/sales", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("not_reviewed"));
}

#[tokio::test]
async fn adding_past_stock_is_conflict_and_leaves_line() {
    let app = test_app().await;

    // Pão Francês has stock 3.
    for _ in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/cart/items",
            Some(json!({ "barcode": "7891234567891" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567891" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("insufficient_stock"));

    let (_, cart) = send(&app, "GET", "/api/cart", None).await;
    assert_eq!(cart["cart"]["totalQuantity"], json!(3));
}

#[tokio::test]
async fn discount_above_subtotal_is_unprocessable() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({
            "discountCents": 900,
            "paymentMethod": "card",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], json!("invalid_discount"));
}

#[tokio::test]
async fn cash_short_is_bad_request() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({
            "paymentMethod": "cash",
            "cashTenderedCents": 849,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("insufficient_cash"));
}

#[tokio::test]
async fn cart_edit_discards_review() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({ "paymentMethod": "card" })),
    )
    .await;

    // Editing the cart drops back to building.
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567892" })),
    )
    .await;
    let (_, cart) = send(&app, "GET", "/api/cart", None).await;
    assert_eq!(cart["phase"], json!("building"));

    // So a commit now needs a fresh review.
    let (status, _) = send(&app, "POST", "/api/sales", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn idempotent_commit_echoes_sale() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({ "paymentMethod": "pix" })),
    )
    .await;

    let (status, first) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "idempotencyKey": "retry-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Client retries the exact same commit: same cart, same key.
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({ "paymentMethod": "pix" })),
    )
    .await;
    let (status, replay) = send(
        &app,
        "POST",
        "/api/sales",
        Some(json!({ "idempotencyKey": "retry-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(replay["sale"]["id"], first["sale"]["id"]);
    assert_eq!(replay["sale"]["saleNumber"], first["sale"]["saleNumber"]);

    // Stock was charged exactly once.
    let (_, product) = send(&app, "GET", "/api/products/barcode/7891234567890", None).await;
    assert_eq!(product["product"]["stock"], json!(49));
}

#[tokio::test]
async fn quantity_patch_and_line_removal() {
    let app = test_app().await;
    let (_, added) = send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;
    let product_id = added["cart"]["lines"][0]["productId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/cart/items/{product_id}"),
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["totalQuantity"], json!(5));

    // Quantity 0 voids the line.
    let (_, body) = send(
        &app,
        "PATCH",
        &format!("/api/cart/items/{product_id}"),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(body["cart"]["lineCount"], json!(0));
}

#[tokio::test]
async fn sale_detail_includes_items() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/cart/items",
        Some(json!({ "barcode": "7891234567890" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/checkout/review",
        Some(json!({ "paymentMethod": "card" })),
    )
    .await;
    let (_, committed) = send(&app, "POST", "/api/sales", Some(json!({}))).await;
    let id = committed["sale"]["id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/sales/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["nameSnapshot"], json!("Coca-Cola 2L"));
    assert_eq!(body["items"][0]["lineTotalCents"], json!(850));
}

#[tokio::test]
async fn daily_report_rejects_bad_date() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/reports/daily?date=17-05-2024", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("validation_error"));
}
