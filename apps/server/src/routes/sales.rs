//! Sale routes: commit the reviewed cart, browse history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    /// Client retry token. A repeat commit with the same key echoes the
    /// original sale instead of charging stock twice.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// `POST /api/sales` - commit the reviewed session cart.
///
/// ## Flow
/// ```text
/// lock    → begin_commit (Reviewing → Committing, draft out)
/// unlock  → SaleRepository::commit (the single transaction)
/// lock    → success: complete_commit (cart cleared)
///           failure: fail_commit (back to Reviewing, cart intact)
/// ```
/// The snapshot is cleared only after a successful commit.
pub async fn commit(
    State(state): State<AppState>,
    body: Option<Json<CommitRequest>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let Json(body) = body.unwrap_or_default();

    let draft = state
        .session
        .with(|session| session.begin_commit(body.idempotency_key))?;

    match state.db.sales().commit(&draft).await {
        Ok(sale) => {
            state.session.with(|session| session.complete_commit());
            if let Err(e) = state.db.cart_snapshots().clear(&state.terminal_id).await {
                warn!(terminal = %state.terminal_id, error = %e, "Snapshot clear failed");
            }
            Ok((
                StatusCode::CREATED,
                Json(json!({ "success": true, "sale": sale })),
            ))
        }
        Err(e) => {
            // Whatever went wrong, the cashier keeps the cart and the
            // review so they can fix the problem and retry.
            state.session.with(|session| session.fail_commit());
            Err(e.into())
        }
    }
}

/// `GET /api/sales?limit=&page=` - history, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query.limit.unwrap_or(10);
    let page = query.page.unwrap_or(1);

    let (sales, total) = state.db.sales().list(limit, page).await?;
    Ok(Json(json!({
        "success": true,
        "sales": sales,
        "total": total,
        "page": page.max(1),
        "limit": limit.clamp(1, 100),
    })))
}

/// `GET /api/sales/{id}` - one sale with its line items.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Sale not found: {id}")))?;
    let items = state.db.sales().get_items(&id).await?;

    Ok(Json(json!({ "success": true, "sale": sale, "items": items })))
}
