//! Checkout routes: lock the review, or abandon it.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use caixa_core::{Money, PaymentMethod};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Flat discount in cents. Defaults to zero.
    #[serde(default)]
    pub discount_cents: i64,
    pub payment_method: PaymentMethod,
    /// Required for cash, rejected for card/pix.
    pub cash_tendered_cents: Option<i64>,
}

/// `POST /api/checkout/review` - lock totals and payment for the cart.
///
/// Returns the locked numbers the cashier confirms out loud: subtotal,
/// discount, total and (for cash) the change due.
pub async fn review(
    State(state): State<AppState>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let review = state.session.with(|session| {
        session
            .start_review(
                Money::from_cents(body.discount_cents),
                body.payment_method,
                body.cash_tendered_cents.map(Money::from_cents),
            )
            .map(|r| r.clone())
    })?;

    Ok(Json(json!({ "success": true, "review": review })))
}

/// `POST /api/checkout/cancel` - abandon the review, cart intact.
pub async fn cancel(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.session.with(|session| session.cancel_review())?;
    Ok(Json(json!({ "success": true })))
}
