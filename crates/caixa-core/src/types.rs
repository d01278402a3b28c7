//! # Domain Types
//!
//! Core domain types used throughout Caixa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  barcode (biz)  │   │  sale_number    │   │  name_snapshot  │       │
//! │  │  name           │   │  status         │   │  unit_price     │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  │  stock          │   │  payment_method │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleStatus    │   │ PaymentMethod   │   │  DailyReport    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Completed      │   │  Cash           │   │  by method      │       │
//! │  │  Voided         │   │  Card           │   │  grand totals   │       │
//! │  └─────────────────┘   │  Pix            │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (barcode, sale_number) - human-readable, what the cashier sees

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.) - business identifier, unique.
    pub barcode: String,

    /// Display name shown to cashier and on the sale record.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional category ("Bebidas", "Padaria", ...).
    pub category: Option<String>,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Current stock level. Never negative (enforced at commit).
    pub stock: i64,

    /// Whether product is active (soft delete). Inactive products
    /// never resolve on barcode lookup.
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the requested quantity can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock >= quantity
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// A sale row only ever exists once committed, so `Completed` is the
/// normal state. `Voided` is reserved for a future refund transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled/refunded after the fact.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer settled the sale.
///
/// Cash is the only method that involves tendered-amount / change math;
/// card and pix settle on an external device for the exact total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment (tendered amount and change apply).
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Instant bank transfer (Pix).
    Pix,
}

impl PaymentMethod {
    /// Whether this method requires a tendered amount and change calculation.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Stable lowercase name, matching the wire and database encoding.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Pix => "pix",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Monotonically increasing business identifier ("sale #42").
    pub sale_number: i64,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// For cash: amount the customer handed over.
    pub cash_tendered_cents: Option<i64>,
    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,
    /// Client-supplied retry token. Unique when present.
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a committed sale.
/// Uses the snapshot pattern to freeze product data at time of sale:
/// the barcode, name and unit price are re-read from the live product
/// row inside the commit transaction, not taken from the cart cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Barcode at time of sale (frozen).
    pub barcode_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Daily Report
// =============================================================================

/// Aggregated totals for one payment method within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodTotal {
    pub method: PaymentMethod,
    pub total_cents: i64,
    pub sale_count: i64,
}

/// End-of-day summary: completed sales for one calendar day (UTC),
/// grouped by payment method. Derived data, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub by_payment_method: Vec<PaymentMethodTotal>,
    pub total_cents: i64,
    pub sale_count: i64,
}

impl DailyReport {
    /// An empty report for a day with no sales.
    pub fn empty(date: NaiveDate) -> Self {
        DailyReport {
            date,
            by_payment_method: Vec::new(),
            total_cents: 0,
            sale_count: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
