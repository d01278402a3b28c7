//! # Product Repository
//!
//! Catalog access: barcode lookup, listing, and the guarded stock
//! decrement that backs the sale committer.
//!
//! ## Barcode Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Barcode Scan Flow                                  │
//! │                                                                         │
//! │  Scanner emits "7894900011517"                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_by_barcode("7894900011517")                                       │
//! │       │                                                                 │
//! │       ├── Active product found ──► Some(Product) ──► cart.add_product  │
//! │       │                                                                 │
//! │       └── Missing OR inactive ──► None ──► "Produto não encontrado"    │
//! │                                            (cart untouched)            │
//! │                                                                         │
//! │  Inactive products are invisible here by design: a discontinued        │
//! │  product must not be sellable even if its barcode still scans.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use caixa_core::{CoreError, Product};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Looks up an **active** product by barcode.
    ///
    /// Returns `None` for unknown barcodes and for inactive products;
    /// the two cases are indistinguishable to the caller on purpose.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode, "Looking up product by barcode");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, description, category,
                   price_cents, stock, is_active, created_at, updated_at
            FROM products
            WHERE barcode = ? AND is_active = 1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Looks up a product by id, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, description, category,
                   price_cents, stock, is_active, created_at, updated_at
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all active products, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, description, category,
                   price_cents, stock, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Decrements stock with a compare-and-decrement guard.
    ///
    /// ## The Guard
    /// ```sql
    /// UPDATE products SET stock = stock - ?
    /// WHERE id = ? AND stock >= ? AND is_active = 1
    /// ```
    /// Zero rows affected means the product vanished, went inactive, or
    /// doesn't have enough stock - the caller gets a typed error either
    /// way and stock never goes negative (the schema CHECK backs this up).
    ///
    /// The sale committer runs the same statement inside its transaction;
    /// this standalone version exists for direct stock adjustments.
    pub async fn decrement_stock(&self, id: &str, amount: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?, updated_at = ?
            WHERE id = ? AND stock >= ? AND is_active = 1
            "#,
        )
        .bind(amount)
        .bind(Utc::now())
        .bind(id)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "missing" from "not enough stock" for the error.
            return match self.get_by_id(id).await? {
                Some(p) if p.is_active => Err(DbError::Domain(CoreError::InsufficientStock {
                    name: p.name,
                    available: p.stock,
                    requested: amount,
                })),
                _ => Err(DbError::not_found("Product", id)),
            };
        }

        Ok(())
    }

    /// Inserts a product. Used by the seed binary and tests.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, barcode, name, description, category,
                 price_cents, stock, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts all products (active and inactive).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
