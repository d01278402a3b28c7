//! Catalog routes: listing and barcode lookup.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/products` - all active products, sorted by name.
pub async fn list(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let products = state.db.products().list_active().await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

/// `GET /api/products/barcode/{barcode}` - scan lookup.
///
/// A barcode that is blank after trimming is a validation error, and an
/// unknown (or inactive) barcode is a plain 404. Neither touches the cart.
pub async fn get_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Err(ApiError::bad_request(
            "validation_error",
            "barcode is required",
        ));
    }

    debug!(barcode, "Barcode lookup");
    match state.db.products().get_by_barcode(barcode).await? {
        Some(product) => Ok(Json(json!({ "success": true, "product": product }))),
        None => Err(ApiError::not_found(format!("Product not found: {barcode}"))),
    }
}
