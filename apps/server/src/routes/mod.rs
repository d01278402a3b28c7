//! # HTTP Routes
//!
//! The full API surface of the terminal:
//!
//! ```text
//! GET    /api/health
//! GET    /api/products                      catalog listing
//! GET    /api/products/barcode/{barcode}    scan lookup
//! GET    /api/cart                          current cart view
//! DELETE /api/cart                          cancel sale (empty the cart)
//! POST   /api/cart/items                    scan into cart {barcode}
//! PATCH  /api/cart/items/{product_id}       set quantity {quantity}
//! DELETE /api/cart/items/{product_id}       void a line
//! POST   /api/checkout/review               lock totals + payment
//! POST   /api/checkout/cancel               back to building
//! POST   /api/sales                         commit the reviewed cart
//! GET    /api/sales?limit=&page=            history, newest first
//! GET    /api/sales/{id}                    one sale with items
//! GET    /api/reports/daily?date=           end-of-day summary
//! ```
//!
//! Every response carries the `{"success": ...}` envelope; errors are
//! rendered by [`crate::error::ApiError`].

pub mod cart;
pub mod checkout;
pub mod products;
pub mod reports;
pub mod sales;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Builds the application router with all routes attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/products", get(products::list))
        .route(
            "/api/products/barcode/{barcode}",
            get(products::get_by_barcode),
        )
        .route("/api/cart", get(cart::view).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{product_id}",
            axum::routing::patch(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/api/checkout/review", post(checkout::review))
        .route("/api/checkout/cancel", post(checkout::cancel))
        .route("/api/sales", post(sales::commit).get(sales::list))
        .route("/api/sales/{id}", get(sales::get_by_id))
        .route("/api/reports/daily", get(reports::daily))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "status": "ok" }))
}
