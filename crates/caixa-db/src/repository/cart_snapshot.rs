//! # Cart Snapshot Repository
//!
//! Best-effort persistence of the in-progress cart, one snapshot per
//! terminal. If the terminal crashes or restarts mid-sale, the cashier
//! gets the cart back instead of rescanning everything.
//!
//! ## Best-Effort Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save()  fails?  → caller logs a warning, the cart operation still     │
//! │                    succeeds (the in-memory cart is the truth)          │
//! │  load()  corrupt → None, as if no snapshot existed                     │
//! │  clear() called after every successful commit                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use caixa_core::Cart;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::{DbError, DbResult};

/// Repository for per-terminal cart snapshots.
#[derive(Debug, Clone)]
pub struct CartSnapshotRepository {
    pool: SqlitePool,
}

impl CartSnapshotRepository {
    /// Creates a new cart snapshot repository.
    pub fn new(pool: SqlitePool) -> Self {
        CartSnapshotRepository { pool }
    }

    /// Upserts the serialized cart for a terminal.
    pub async fn save(&self, terminal_id: &str, cart: &Cart) -> DbResult<()> {
        let payload = serde_json::to_string(cart)
            .map_err(|e| DbError::Internal(format!("cart serialization failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (terminal_id, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (terminal_id)
            DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
            "#,
        )
        .bind(terminal_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the snapshot for a terminal.
    ///
    /// A corrupt payload is logged and treated as no snapshot - recovery
    /// must never wedge the terminal.
    pub async fn load(&self, terminal_id: &str) -> DbResult<Option<Cart>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM cart_snapshots WHERE terminal_id = ?")
                .bind(terminal_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<Cart>(&payload) {
            Ok(cart) => Ok(Some(cart)),
            Err(e) => {
                warn!(terminal_id, error = %e, "Discarding corrupt cart snapshot");
                Ok(None)
            }
        }
    }

    /// Removes the snapshot for a terminal. Missing snapshot is not an error.
    pub async fn clear(&self, terminal_id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM cart_snapshots WHERE terminal_id = ?")
            .bind(terminal_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
