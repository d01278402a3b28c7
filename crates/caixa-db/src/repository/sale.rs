//! # Sale Repository
//!
//! The transactional sale committer, sale history, and the daily report.
//!
//! ## Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Sale Commit (ONE transaction)                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. idempotency_key already committed?  → return that sale, done     │
//! │    2. per cart line:                                                    │
//! │         re-fetch live product row                                       │
//! │         missing/inactive      → ProductNotFound  (ROLLBACK)            │
//! │         stock < quantity      → InsufficientStock (ROLLBACK)           │
//! │         UPDATE products SET stock = stock - qty                         │
//! │           WHERE id = ? AND stock >= qty      ← the guard                │
//! │         snapshot barcode/name/price from the LIVE row                   │
//! │    3. recompute subtotal from live prices                               │
//! │       re-validate discount and (cash) tendered amount                   │
//! │    4. sale_number = MAX(sale_number) + 1                                │
//! │    5. INSERT sale + items                                               │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls everything back: zero sale rows, zero stock          │
//! │  change. Check and decrement happen under the same write                │
//! │  transaction, so two terminals can never both take the last unit.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use caixa_core::{
    checkout, CommitDraft, CoreError, DailyReport, Money, PaymentMethod, PaymentMethodTotal,
    Product, Sale, SaleItem, SaleStatus,
};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for sale commit, history and reporting.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new sale repository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Commits a sale draft atomically.
    ///
    /// See the module docs for the transaction walkthrough. On success the
    /// returned `Sale` carries the allocated `sale_number` and the totals
    /// recomputed from commit-time prices - which may differ from what the
    /// cashier reviewed if the catalog changed underneath the cart.
    pub async fn commit(&self, draft: &CommitDraft) -> DbResult<Sale> {
        if draft.lines.is_empty() {
            return Err(DbError::Domain(CoreError::EmptyCart));
        }

        let mut tx = self.pool.begin().await?;

        // Retry token: a key that already committed echoes the original
        // sale with stock untouched.
        if let Some(key) = &draft.idempotency_key {
            if let Some(existing) = Self::fetch_by_idempotency_key(&mut tx, key).await? {
                debug!(key, sale_number = existing.sale_number, "Idempotent replay");
                tx.commit().await?;
                return Ok(existing);
            }
        }

        // Decrement stock per line, snapshotting live product data.
        let mut snapshots: Vec<(Product, i64)> = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, barcode, name, description, category,
                       price_cents, stock, is_active, created_at, updated_at
                FROM products
                WHERE id = ?
                "#,
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let product = match product {
                Some(p) if p.is_active => p,
                _ => {
                    return Err(DbError::Domain(CoreError::ProductNotFound(
                        line.name.clone(),
                    )))
                }
            };

            if product.stock < line.quantity {
                return Err(DbError::Domain(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }));
            }

            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?, updated_at = ?
                WHERE id = ? AND stock >= ?
                "#,
            )
            .bind(line.quantity)
            .bind(Utc::now())
            .bind(&product.id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // The check above ran in this same write transaction, so
                // this only trips on the schema CHECK edge.
                return Err(DbError::Domain(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }));
            }

            snapshots.push((product, line.quantity));
        }

        // Recompute money from commit-time prices and re-validate.
        let subtotal_cents: i64 = snapshots
            .iter()
            .map(|(p, qty)| p.price_cents * qty)
            .sum();
        let subtotal = Money::from_cents(subtotal_cents);
        let discount = Money::from_cents(draft.discount_cents);
        checkout::validate_discount(subtotal, discount).map_err(DbError::Domain)?;
        let total = subtotal - discount;

        let change = checkout::settle_payment(
            &caixa_core::CheckoutTotals {
                subtotal_cents,
                discount_cents: discount.cents(),
                total_cents: total.cents(),
            },
            draft.payment_method,
            draft.cash_tendered_cents.map(Money::from_cents),
        )
        .map_err(DbError::Domain)?;

        // Business counter, allocated under the write lock.
        let sale_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(sale_number), 0) + 1 FROM sales")
                .fetch_one(&mut *tx)
                .await?;

        let sale = Sale {
            id: uuid::Uuid::new_v4().to_string(),
            sale_number,
            status: SaleStatus::Completed,
            subtotal_cents,
            discount_cents: discount.cents(),
            total_cents: total.cents(),
            payment_method: draft.payment_method,
            cash_tendered_cents: draft.cash_tendered_cents,
            change_cents: change.map(|m| m.cents()),
            idempotency_key: draft.idempotency_key.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO sales
                (id, sale_number, status, subtotal_cents, discount_cents,
                 total_cents, payment_method, cash_tendered_cents,
                 change_cents, idempotency_key, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.sale_number)
        .bind(sale.status)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.cash_tendered_cents)
        .bind(sale.change_cents)
        .bind(&sale.idempotency_key)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for ((product, quantity), line) in snapshots.iter().zip(&draft.lines) {
            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (id, sale_id, product_id, barcode_snapshot, name_snapshot,
                     unit_price_cents, quantity, line_total_cents)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(&product.barcode)
            .bind(&product.name)
            .bind(product.price_cents)
            .bind(quantity)
            .bind(product.price_cents * quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_number = sale.sale_number,
            total_cents = sale.total_cents,
            method = sale.payment_method.as_str(),
            "Sale committed"
        );
        Ok(sale)
    }

    async fn fetch_by_idempotency_key(
        tx: &mut Transaction<'_, Sqlite>,
        key: &str,
    ) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, status, subtotal_cents, discount_cents,
                   total_cents, payment_method, cash_tendered_cents,
                   change_cents, idempotency_key, created_at
            FROM sales
            WHERE idempotency_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    /// Fetches a sale by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, status, subtotal_cents, discount_cents,
                   total_cents, payment_method, cash_tendered_cents,
                   change_cents, idempotency_key, created_at
            FROM sales
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Fetches the line items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, barcode_snapshot, name_snapshot,
                   unit_price_cents, quantity, line_total_cents
            FROM sale_items
            WHERE sale_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales newest first, paginated. `page` is 1-based.
    /// Returns the page plus the total sale count.
    pub async fn list(&self, limit: i64, page: i64) -> DbResult<(Vec<Sale>, i64)> {
        let limit = limit.clamp(1, 100);
        let offset = (page.max(1) - 1) * limit;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number, status, subtotal_cents, discount_cents,
                   total_cents, payment_method, cash_tendered_cents,
                   change_cents, idempotency_key, created_at
            FROM sales
            ORDER BY sale_number DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok((sales, total))
    }

    // -------------------------------------------------------------------------
    // Reporting
    // -------------------------------------------------------------------------

    /// End-of-day summary for one UTC calendar day.
    ///
    /// Aggregates **completed** sales with `created_at` in
    /// `[date 00:00, date+1 00:00)`, grouped by payment method. Voided
    /// sales are excluded. A day with no sales yields an empty report,
    /// not an error.
    pub async fn daily_report(&self, date: NaiveDate) -> DbResult<DailyReport> {
        let start: DateTime<Utc> = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| DbError::Internal("invalid report date".to_string()))?;
        let end = start + TimeDelta::days(1);

        let rows = sqlx::query_as::<_, (PaymentMethod, i64, i64)>(
            r#"
            SELECT payment_method, SUM(total_cents), COUNT(*)
            FROM sales
            WHERE status = 'completed' AND created_at >= ? AND created_at < ?
            GROUP BY payment_method
            ORDER BY payment_method
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let by_payment_method: Vec<PaymentMethodTotal> = rows
            .into_iter()
            .map(|(method, total_cents, sale_count)| PaymentMethodTotal {
                method,
                total_cents,
                sale_count,
            })
            .collect();

        let total_cents = by_payment_method.iter().map(|m| m.total_cents).sum();
        let sale_count = by_payment_method.iter().map(|m| m.sale_count).sum();

        Ok(DailyReport {
            date,
            by_payment_method,
            total_cents,
            sale_count,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use caixa_core::CartLine;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(
        db: &Database,
        barcode: &str,
        name: &str,
        price_cents: i64,
        stock: i64,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
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
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn line(product: &Product, quantity: i64) -> CartLine {
        CartLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    fn cash_draft(lines: Vec<CartLine>, discount: i64, tendered: i64) -> CommitDraft {
        CommitDraft {
            lines,
            discount_cents: discount,
            payment_method: PaymentMethod::Cash,
            cash_tendered_cents: Some(tendered),
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn test_commit_success_decrements_stock() {
        let db = test_db().await;
        let coke = seed_product(&db, "7894900011517", "Coca-Cola 2L", 850, 50).await;

        let draft = cash_draft(vec![line(&coke, 2)], 200, 2000);
        let sale = db.sales().commit(&draft).await.unwrap();

        assert_eq!(sale.sale_number, 1);
        assert_eq!(sale.subtotal_cents, 1700);
        assert_eq!(sale.discount_cents, 200);
        assert_eq!(sale.total_cents, 1500);
        assert_eq!(sale.change_cents, Some(500));
        assert_eq!(sale.status, SaleStatus::Completed);

        let after = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 48);

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name_snapshot, "Coca-Cola 2L");
        assert_eq!(items[0].line_total_cents, 1700);
    }

    #[tokio::test]
    async fn test_sale_numbers_increase() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;

        let first = db
            .sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();
        let second = db
            .sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();

        assert_eq!(first.sale_number, 1);
        assert_eq!(second.sale_number, 2);
    }

    /// The atomicity property: a failure on the second line rolls back
    /// the first line's decrement and writes no sale rows.
    #[tokio::test]
    async fn test_commit_rolls_back_on_partial_stock() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;
        let scarce = seed_product(&db, "2", "Pão Francês", 50, 1).await;

        let draft = cash_draft(vec![line(&coke, 2), line(&scarce, 5)], 0, 5000);
        let err = db.sales().commit(&draft).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            })
        ));

        // Nothing changed anywhere.
        let coke_after = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(coke_after.stock, 50);
        let (sales, total) = db.sales().list(10, 1).await.unwrap();
        assert!(sales.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_commit_empty_cart_rejected() {
        let db = test_db().await;
        let err = db
            .sales()
            .commit(&cash_draft(vec![], 0, 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_commit_inactive_product_rejected() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;
        sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?")
            .bind(&coke.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    /// Stale cart: the price changed between scan and commit. The sale
    /// snapshots the live price and recomputes totals from it.
    #[tokio::test]
    async fn test_commit_uses_live_price() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;
        let stale = line(&coke, 2); // cached at 850

        sqlx::query("UPDATE products SET price_cents = 900 WHERE id = ?")
            .bind(&coke.id)
            .execute(db.pool())
            .await
            .unwrap();

        let sale = db
            .sales()
            .commit(&cash_draft(vec![stale], 0, 2000))
            .await
            .unwrap();

        assert_eq!(sale.subtotal_cents, 1800);
        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items[0].unit_price_cents, 900);
    }

    #[tokio::test]
    async fn test_commit_revalidates_cash_against_live_total() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;
        let stale = line(&coke, 2);

        // Price hike makes the reviewed tendered amount insufficient.
        sqlx::query("UPDATE products SET price_cents = 1100 WHERE id = ?")
            .bind(&coke.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .sales()
            .commit(&cash_draft(vec![stale], 0, 1700))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientCash {
                total_cents: 2200,
                tendered_cents: 1700,
            })
        ));

        // Rolled back: stock untouched.
        let after = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 50);
    }

    #[tokio::test]
    async fn test_idempotency_key_echoes_original_sale() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;

        let mut draft = cash_draft(vec![line(&coke, 2)], 0, 2000);
        draft.idempotency_key = Some("retry-abc".to_string());

        let first = db.sales().commit(&draft).await.unwrap();
        let replay = db.sales().commit(&draft).await.unwrap();

        assert_eq!(replay.id, first.id);
        assert_eq!(replay.sale_number, first.sale_number);

        // Stock decremented exactly once.
        let after = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 48);
        let (_, total) = db.sales().list(10, 1).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_card_sale_has_no_change() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;

        let draft = CommitDraft {
            lines: vec![line(&coke, 1)],
            discount_cents: 0,
            payment_method: PaymentMethod::Card,
            cash_tendered_cents: None,
            idempotency_key: None,
        };
        let sale = db.sales().commit(&draft).await.unwrap();

        assert_eq!(sale.payment_method, PaymentMethod::Card);
        assert_eq!(sale.cash_tendered_cents, None);
        assert_eq!(sale.change_cents, None);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pagination() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;
        for _ in 0..3 {
            db.sales()
                .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
                .await
                .unwrap();
        }

        let (page1, total) = db.sales().list(2, 1).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].sale_number, 3);

        let (page2, _) = db.sales().list(2, 2).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].sale_number, 1);
    }

    #[tokio::test]
    async fn test_daily_report_groups_by_method() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;

        db.sales()
            .commit(&cash_draft(vec![line(&coke, 2)], 0, 2000))
            .await
            .unwrap();
        db.sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();
        db.sales()
            .commit(&CommitDraft {
                lines: vec![line(&coke, 1)],
                discount_cents: 0,
                payment_method: PaymentMethod::Pix,
                cash_tendered_cents: None,
                idempotency_key: None,
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let report = db.sales().daily_report(today).await.unwrap();

        assert_eq!(report.sale_count, 3);
        assert_eq!(report.total_cents, 1700 + 850 + 850);

        let cash = report
            .by_payment_method
            .iter()
            .find(|m| m.method == PaymentMethod::Cash)
            .unwrap();
        assert_eq!(cash.sale_count, 2);
        assert_eq!(cash.total_cents, 2550);

        let pix = report
            .by_payment_method
            .iter()
            .find(|m| m.method == PaymentMethod::Pix)
            .unwrap();
        assert_eq!(pix.sale_count, 1);
    }

    #[tokio::test]
    async fn test_daily_report_excludes_other_days_and_voided() {
        let db = test_db().await;
        let coke = seed_product(&db, "1", "Coca-Cola 2L", 850, 50).await;

        let yesterday_sale = db
            .sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();
        let voided_sale = db
            .sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();
        db.sales()
            .commit(&cash_draft(vec![line(&coke, 1)], 0, 850))
            .await
            .unwrap();

        let yesterday = Utc::now() - TimeDelta::days(1);
        sqlx::query("UPDATE sales SET created_at = ? WHERE id = ?")
            .bind(yesterday)
            .bind(&yesterday_sale.id)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE sales SET status = 'voided' WHERE id = ?")
            .bind(&voided_sale.id)
            .execute(db.pool())
            .await
            .unwrap();

        let report = db.sales().daily_report(Utc::now().date_naive()).await.unwrap();
        assert_eq!(report.sale_count, 1);
        assert_eq!(report.total_cents, 850);
    }

    #[tokio::test]
    async fn test_daily_report_empty_day() {
        let db = test_db().await;
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let report = db.sales().daily_report(date).await.unwrap();
        assert_eq!(report.sale_count, 0);
        assert_eq!(report.total_cents, 0);
        assert!(report.by_payment_method.is_empty());
    }
}
