//! Reporting routes.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// `YYYY-MM-DD`; defaults to today (UTC).
    pub date: Option<String>,
}

/// `GET /api/reports/daily?date=YYYY-MM-DD` - end-of-day summary.
///
/// Completed sales for the given UTC day, grouped by payment method.
/// A day with no sales yields an empty report, not an error.
pub async fn daily(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = match query.date {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            ApiError::bad_request(
                "validation_error",
                format!("date has invalid format: {raw} (expected YYYY-MM-DD)"),
            )
        })?,
        None => Utc::now().date_naive(),
    };

    let report = state.db.sales().daily_report(date).await?;
    Ok(Json(json!({ "success": true, "report": report })))
}
