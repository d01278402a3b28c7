//! Cart routes: scan into cart, edit quantities, void lines.
//!
//! Every successful mutation persists a best-effort snapshot so a crash
//! mid-sale doesn't lose the cart. Snapshot failures are logged, never
//! surfaced: the in-memory cart is the truth.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use caixa_core::{Cart, SessionPhase};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

fn cart_response(cart: &Cart, phase: SessionPhase) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "cart": {
            "lines": cart.lines(),
            "subtotalCents": cart.subtotal_cents(),
            "lineCount": cart.line_count(),
            "totalQuantity": cart.total_quantity(),
        },
        "phase": phase,
    }))
}

/// Persists the current cart snapshot, best-effort.
async fn persist_snapshot(state: &AppState) {
    let cart = state.session.cart_clone();
    if let Err(e) = state
        .db
        .cart_snapshots()
        .save(&state.terminal_id, &cart)
        .await
    {
        warn!(terminal = %state.terminal_id, error = %e, "Cart snapshot save failed");
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart` - the current cart and session phase.
pub async fn view(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (cart, phase) = state
        .session
        .with(|session| (session.cart().clone(), session.phase()));
    cart_response(&cart, phase)
}

/// `POST /api/cart/items` - scan a barcode into the cart.
pub async fn add_item(
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let barcode = body.barcode.trim();
    if barcode.is_empty() {
        return Err(ApiError::bad_request(
            "validation_error",
            "barcode is required",
        ));
    }

    let product = state
        .db
        .products()
        .get_by_barcode(barcode)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {barcode}")))?;

    let (cart, phase) = state.session.with(|session| {
        session.add_product(&product)?;
        Ok::<_, ApiError>((session.cart().clone(), session.phase()))
    })?;

    persist_snapshot(&state).await;
    Ok(cart_response(&cart, phase))
}

/// `PATCH /api/cart/items/{product_id}` - set a line's quantity.
/// A quantity below 1 voids the line.
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {product_id}")))?;

    let (cart, phase) = state.session.with(|session| {
        session.set_quantity(&product, body.quantity)?;
        Ok::<_, ApiError>((session.cart().clone(), session.phase()))
    })?;

    persist_snapshot(&state).await;
    Ok(cart_response(&cart, phase))
}

/// `DELETE /api/cart/items/{product_id}` - void a line.
pub async fn remove_item(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (cart, phase) = state.session.with(|session| {
        session.remove_line(&product_id)?;
        Ok::<_, ApiError>((session.cart().clone(), session.phase()))
    })?;

    persist_snapshot(&state).await;
    Ok(cart_response(&cart, phase))
}

/// `DELETE /api/cart` - cancel the sale, emptying the cart.
pub async fn clear(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let (cart, phase) = state.session.with(|session| {
        session.clear_cart()?;
        Ok::<_, ApiError>((session.cart().clone(), session.phase()))
    })?;

    persist_snapshot(&state).await;
    Ok(cart_response(&cart, phase))
}
