//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caixa-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caixa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in the server app)                                   │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every variant is recoverable at the UI layer - the process never
//!    crashes on a bad cart or a missing product

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or is inactive).
    ///
    /// Recoverable: the cashier re-scans or types a different barcode.
    /// The cart is never mutated on this error.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The referenced product has no line in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotInCart(String),

    /// Insufficient stock for a cart edit or a commit.
    ///
    /// ## When This Occurs
    /// - Adding one more unit than the product has in stock
    /// - Setting a line quantity above the known stock
    /// - Commit-time re-validation against live stock
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Coca-Cola 2L", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Coca-Cola 2L in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cash tendered is below the total due.
    #[error("Insufficient cash: total {total_cents}, tendered {tendered_cents}")]
    InsufficientCash {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// Discount is negative or exceeds the cart subtotal.
    ///
    /// A discount larger than the subtotal is a caller input error and is
    /// rejected, never silently clamped to zero.
    #[error("Invalid discount: {discount_cents} against subtotal {subtotal_cents}")]
    InvalidDiscount {
        discount_cents: i64,
        subtotal_cents: i64,
    },

    /// Checkout or commit attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Commit attempted without a reviewed checkout.
    #[error("Checkout has not been reviewed")]
    NotReviewed,

    /// A commit for this session is already in flight.
    ///
    /// Protects against double-charging stock when the cashier retries
    /// while the previous attempt is still suspended on the network.
    #[error("A commit is already in progress for this session")]
    CommitInFlight,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// A monetary or count field is negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (unknown payment method, malformed date, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
