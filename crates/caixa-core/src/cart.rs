//! # Cart Module
//!
//! In-memory shopping cart for the active checkout session.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Lifecycle                                  │
//! │                                                                         │
//! │  Scan barcode ──► add_product ──┬── line exists? quantity += 1          │
//! │                                 └── new line, quantity = 1              │
//! │                                                                         │
//! │  Edit quantity ──► set_quantity ──┬── qty < 1?  remove the line         │
//! │                                   └── qty > stock?  reject, unchanged   │
//! │                                                                         │
//! │  Void line ──► remove_line        Cancel sale ──► clear                 │
//! │                                                                         │
//! │  The cart is PURE STATE: no I/O, no locking, no persistence here.      │
//! │  The session layer owns the mutex; the snapshot repository owns        │
//! │  persistence.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Semantics
//! Cart-time stock checks use the product's last-known stock and are a
//! courtesy to the cashier. The commit transaction re-validates against
//! live stock; the cart check alone is never trusted for correctness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Limits
// =============================================================================

/// Maximum number of distinct lines in a cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity for a single line.
pub const MAX_LINE_QUANTITY: i64 = 999;

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart: a product and how many of it.
///
/// The price and name here are a display cache captured at add time.
/// The commit transaction re-reads both from the live product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub barcode: String,
    pub name: String,
    /// Unit price in cents at the time the line was added (display only).
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Line total in cents (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cashier's in-progress cart.
///
/// Lines keep insertion order (first scan first) and there is at most
/// one line per product id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product to the cart.
    ///
    /// - Existing line: quantity += 1, capped by the product's stock.
    ///   Exceeding stock yields `InsufficientStock` and leaves the line
    ///   unchanged.
    /// - New line: quantity 1, rejected up front when stock < 1.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let requested = line.quantity + 1;
            if requested > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested,
                    max: MAX_LINE_QUANTITY,
                });
            }
            if requested > product.stock {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested,
                });
            }
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        if product.stock < 1 {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: 1,
            });
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
            added_at: Utc::now(),
        });
        Ok(())
    }

    /// Sets the quantity of an existing line.
    ///
    /// A quantity below 1 removes the line (matching the register UI,
    /// where typing 0 voids the line). Quantities above the product's
    /// stock or the hard ceiling are rejected with the line unchanged.
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            self.remove_line(&product.id)?;
            return Ok(());
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if quantity > product.stock {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
            .ok_or_else(|| CoreError::ProductNotInCart(product.id.clone()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotInCart(product_id.to_string()));
        }
        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals, in cents.
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Sum of line totals as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents())
    }

    /// Number of distinct lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Read access to the lines, in insertion order.
    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by product id.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
