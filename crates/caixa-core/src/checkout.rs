//! # Checkout Calculator
//!
//! Pure payment math for the checkout screen.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Calculation Flow                          │
//! │                                                                         │
//! │  Cart ──► subtotal                                                      │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  compute_totals(cart, discount)                                         │
//! │              │  rejects: discount < 0, discount > subtotal              │
//! │              ▼                                                          │
//! │  CheckoutTotals { subtotal, discount, total }                           │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  settle_payment(totals, method, tendered)                               │
//! │      cash:     change = tendered - total (InsufficientCash if short)    │
//! │      card/pix: settles externally for the exact total, no change        │
//! │                                                                         │
//! │  Everything here is pure: no I/O, no clock, no randomness.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The commit transaction runs these same functions a second time against
//! commit-time prices, so a stale cart can never produce a wrong total.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Checkout Totals
// =============================================================================

/// The three numbers the cashier confirms before payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl CheckoutTotals {
    /// Total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Computes checkout totals for a cart with a flat discount in cents.
///
/// ## Rules
/// - The cart must not be empty.
/// - The discount must be in `[0, subtotal]`. A discount above the
///   subtotal is rejected with `InvalidDiscount`, never clamped.
/// - `total = subtotal - discount`, always >= 0 by construction.
pub fn compute_totals(cart: &Cart, discount: Money) -> CoreResult<CheckoutTotals> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let subtotal = cart.subtotal();
    validate_discount(subtotal, discount)?;

    Ok(CheckoutTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        total_cents: (subtotal - discount).cents(),
    })
}

/// Validates a discount against a subtotal.
///
/// Split out so the commit path can re-validate against recomputed
/// commit-time totals without rebuilding a cart.
pub fn validate_discount(subtotal: Money, discount: Money) -> CoreResult<()> {
    if discount.is_negative() || discount > subtotal {
        return Err(CoreError::InvalidDiscount {
            discount_cents: discount.cents(),
            subtotal_cents: subtotal.cents(),
        });
    }
    Ok(())
}

/// Computes change for a cash payment.
///
/// Returns `tendered - total`; exact payment yields zero change.
/// Tendering less than the total is `InsufficientCash`.
pub fn compute_change(total: Money, tendered: Money) -> CoreResult<Money> {
    if tendered < total {
        return Err(CoreError::InsufficientCash {
            total_cents: total.cents(),
            tendered_cents: tendered.cents(),
        });
    }
    Ok(tendered - total)
}

/// Settles a payment against locked totals.
///
/// - Cash requires a tendered amount and returns `Some(change)`.
/// - Card/pix settle externally for the exact total: a tendered amount
///   is a caller error, and no change applies (`None`).
pub fn settle_payment(
    totals: &CheckoutTotals,
    method: PaymentMethod,
    tendered: Option<Money>,
) -> CoreResult<Option<Money>> {
    match (method.is_cash(), tendered) {
        (true, Some(cash)) => Ok(Some(compute_change(totals.total(), cash)?)),
        (true, None) => Err(CoreError::Validation(
            crate::error::ValidationError::Required {
                field: "cashTenderedCents".to_string(),
            },
        )),
        (false, None) => Ok(None),
        (false, Some(_)) => Err(CoreError::Validation(
            crate::error::ValidationError::InvalidFormat {
                field: "cashTenderedCents".to_string(),
                reason: format!("not accepted for {} payment", method.as_str()),
            },
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
