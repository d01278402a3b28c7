//! # Checkout Session
//!
//! The state machine for one terminal's checkout flow. This replaces the
//! classic "global mutable cart" with an explicit session object that owns
//! the cart and gates every transition.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Session Phases                             │
//! │                                                                         │
//! │              review(discount, method, tendered)                         │
//! │   ┌──────────┐ ─────────────────────────────► ┌───────────┐            │
//! │   │ Building │                                │ Reviewing │            │
//! │   └──────────┘ ◄───────────────────────────── └───────────┘            │
//! │     ▲    ▲       cancel_review / cart edit       │                     │
//! │     │    │                                       │ begin_commit        │
//! │     │    │ complete_commit                       ▼                     │
//! │     │    │ (cart cleared)                  ┌────────────┐              │
//! │     │    └──────────────────────────────── │ Committing │              │
//! │     │                                      └────────────┘              │
//! │     │                                            │ fail_commit         │
//! │     │                                            ▼ (cart intact)       │
//! │     └───────────────────────────────────── back to Reviewing           │
//! │                                                                         │
//! │  While Committing, every cart edit and every second commit attempt     │
//! │  fails fast with CommitInFlight. The session itself does no I/O:       │
//! │  begin_commit hands out a draft, the caller runs the DB transaction,   │
//! │  then settles the outcome with complete_commit or fail_commit.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::checkout::{self, CheckoutTotals};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Product};

// =============================================================================
// Reviewed Checkout
// =============================================================================

/// The locked outcome of a checkout review: totals, payment method and
/// (for cash) the tendered amount and computed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedCheckout {
    pub totals: CheckoutTotals,
    pub payment_method: PaymentMethod,
    pub cash_tendered_cents: Option<i64>,
    pub change_cents: Option<i64>,
}

// =============================================================================
// Commit Draft
// =============================================================================

/// Everything the sale committer needs, snapshotted out of the session so
/// the session lock is not held across the database transaction.
#[derive(Debug, Clone)]
pub struct CommitDraft {
    pub lines: Vec<CartLine>,
    pub discount_cents: i64,
    pub payment_method: PaymentMethod,
    pub cash_tendered_cents: Option<i64>,
    pub idempotency_key: Option<String>,
}

// =============================================================================
// Session Phase
// =============================================================================

/// Which stage of the flow the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Cart is being built; totals are live.
    Building,
    /// Totals are locked and a payment method is chosen.
    Reviewing,
    /// A commit is in flight against the database.
    Committing,
}

#[derive(Debug, Clone)]
enum Phase {
    Building,
    Reviewing(ReviewedCheckout),
    Committing(ReviewedCheckout),
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One terminal's cart plus the phase gating around it.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    cart: Cart,
    phase: Phase,
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutSession {
    /// A fresh session with an empty cart.
    pub fn new() -> Self {
        CheckoutSession {
            cart: Cart::new(),
            phase: Phase::Building,
        }
    }

    /// Restores a session from a persisted cart snapshot.
    /// The restored session always starts in `Building`; a review is
    /// never resurrected across a restart.
    pub fn from_cart(cart: Cart) -> Self {
        CheckoutSession {
            cart,
            phase: Phase::Building,
        }
    }

    /// Read access to the cart.
    #[inline]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The current phase.
    pub fn phase(&self) -> SessionPhase {
        match self.phase {
            Phase::Building => SessionPhase::Building,
            Phase::Reviewing(_) => SessionPhase::Reviewing,
            Phase::Committing(_) => SessionPhase::Committing,
        }
    }

    /// The locked review, when one exists.
    pub fn review(&self) -> Option<&ReviewedCheckout> {
        match &self.phase {
            Phase::Building => None,
            Phase::Reviewing(r) | Phase::Committing(r) => Some(r),
        }
    }

    // -------------------------------------------------------------------------
    // Cart edits
    // -------------------------------------------------------------------------

    /// Adds one unit of a product. Editing during `Reviewing` discards the
    /// locked review; editing during `Committing` is rejected.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        self.unlock_for_edit()?;
        self.cart.add_product(product)
    }

    /// Sets a line's quantity (below 1 removes the line).
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.unlock_for_edit()?;
        self.cart.set_quantity(product, quantity)
    }

    /// Removes a line.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        self.unlock_for_edit()?;
        self.cart.remove_line(product_id)
    }

    /// Empties the cart and drops any review.
    pub fn clear_cart(&mut self) -> CoreResult<()> {
        self.unlock_for_edit()?;
        self.cart.clear();
        Ok(())
    }

    fn unlock_for_edit(&mut self) -> CoreResult<()> {
        match self.phase {
            Phase::Committing(_) => Err(CoreError::CommitInFlight),
            Phase::Reviewing(_) => {
                // Any cart change invalidates the locked totals.
                self.phase = Phase::Building;
                Ok(())
            }
            Phase::Building => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Review
    // -------------------------------------------------------------------------

    /// Locks totals and payment for the current cart: `Building` (or a
    /// re-review from `Reviewing`) → `Reviewing`.
    pub fn start_review(
        &mut self,
        discount: Money,
        payment_method: PaymentMethod,
        cash_tendered: Option<Money>,
    ) -> CoreResult<&ReviewedCheckout> {
        if matches!(self.phase, Phase::Committing(_)) {
            return Err(CoreError::CommitInFlight);
        }

        let totals = checkout::compute_totals(&self.cart, discount)?;
        let change = checkout::settle_payment(&totals, payment_method, cash_tendered)?;

        self.phase = Phase::Reviewing(ReviewedCheckout {
            totals,
            payment_method,
            cash_tendered_cents: cash_tendered.map(|m| m.cents()),
            change_cents: change.map(|m| m.cents()),
        });
        match &self.phase {
            Phase::Reviewing(r) => Ok(r),
            _ => unreachable!("phase was just set to Reviewing"),
        }
    }

    /// Abandons the review: `Reviewing` → `Building`, cart intact.
    pub fn cancel_review(&mut self) -> CoreResult<()> {
        match self.phase {
            Phase::Committing(_) => Err(CoreError::CommitInFlight),
            _ => {
                self.phase = Phase::Building;
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Starts a commit: `Reviewing` → `Committing`, handing back the draft
    /// the committer needs. The caller must settle the outcome with
    /// [`complete_commit`](Self::complete_commit) or
    /// [`fail_commit`](Self::fail_commit).
    pub fn begin_commit(&mut self, idempotency_key: Option<String>) -> CoreResult<CommitDraft> {
        let review = match &self.phase {
            Phase::Committing(_) => return Err(CoreError::CommitInFlight),
            Phase::Building => return Err(CoreError::NotReviewed),
            Phase::Reviewing(r) => r.clone(),
        };
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let draft = CommitDraft {
            lines: self.cart.lines().to_vec(),
            discount_cents: review.totals.discount_cents,
            payment_method: review.payment_method,
            cash_tendered_cents: review.cash_tendered_cents,
            idempotency_key,
        };
        self.phase = Phase::Committing(review);
        Ok(draft)
    }

    /// The commit transaction succeeded: clear the cart, `Committing` →
    /// `Building`.
    pub fn complete_commit(&mut self) {
        self.cart.clear();
        self.phase = Phase::Building;
    }

    /// The commit transaction failed or the service was unavailable:
    /// `Committing` → `Reviewing` with the cart untouched, so the cashier
    /// can retry without rescanning.
    pub fn fail_commit(&mut self) {
        if let Phase::Committing(review) = std::mem::replace(&mut self.phase, Phase::Building) {
            self.phase = Phase::Reviewing(review);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            barcode: format!("789{id}"),
            name: name.to_string(),
            description: None,
            category: None,
            price_cents,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reviewed_session() -> CheckoutSession {
        let mut session = CheckoutSession::new();
        let coke = product("p1", "Coca-Cola 2L", 850, 50);
        session.add_product(&coke).unwrap();
        session.add_product(&coke).unwrap();
        session
            .start_review(
                Money::from_cents(200),
                PaymentMethod::Cash,
                Some(Money::from_cents(2000)),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_review_locks_totals_and_change() {
        let session = reviewed_session();
        assert_eq!(session.phase(), SessionPhase::Reviewing);

        let review = session.review().unwrap();
        assert_eq!(review.totals.subtotal_cents, 1700);
        assert_eq!(review.totals.total_cents, 1500);
        assert_eq!(review.change_cents, Some(500));
    }

    #[test]
    fn test_review_requires_non_empty_cart() {
        let mut session = CheckoutSession::new();
        let err = session
            .start_review(Money::zero(), PaymentMethod::Card, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
        assert_eq!(session.phase(), SessionPhase::Building);
    }

    #[test]
    fn test_cart_edit_discards_review() {
        let mut session = reviewed_session();
        let bread = product("p2", "Pão Francês", 50, 100);

        session.add_product(&bread).unwrap();

        assert_eq!(session.phase(), SessionPhase::Building);
        assert!(session.review().is_none());
        assert_eq!(session.cart().line_count(), 2);
    }

    #[test]
    fn test_commit_without_review_rejected() {
        let mut session = CheckoutSession::new();
        let coke = product("p1", "Coca-Cola 2L", 850, 50);
        session.add_product(&coke).unwrap();

        let err = session.begin_commit(None).unwrap_err();
        assert!(matches!(err, CoreError::NotReviewed));
    }

    #[test]
    fn test_begin_commit_hands_out_draft() {
        let mut session = reviewed_session();
        let draft = session.begin_commit(Some("retry-1".to_string())).unwrap();

        assert_eq!(session.phase(), SessionPhase::Committing);
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, 2);
        assert_eq!(draft.discount_cents, 200);
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
        assert_eq!(draft.cash_tendered_cents, Some(2000));
        assert_eq!(draft.idempotency_key.as_deref(), Some("retry-1"));
    }

    #[test]
    fn test_second_commit_while_in_flight_rejected() {
        let mut session = reviewed_session();
        session.begin_commit(None).unwrap();

        let err = session.begin_commit(None).unwrap_err();
        assert!(matches!(err, CoreError::CommitInFlight));
    }

    #[test]
    fn test_cart_edit_while_committing_rejected() {
        let mut session = reviewed_session();
        session.begin_commit(None).unwrap();

        let bread = product("p2", "Pão Francês", 50, 100);
        let err = session.add_product(&bread).unwrap_err();
        assert!(matches!(err, CoreError::CommitInFlight));
        assert_eq!(session.cart().line_count(), 1);
    }

    #[test]
    fn test_complete_commit_clears_cart() {
        let mut session = reviewed_session();
        session.begin_commit(None).unwrap();

        session.complete_commit();

        assert_eq!(session.phase(), SessionPhase::Building);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_fail_commit_preserves_cart_and_review() {
        let mut session = reviewed_session();
        session.begin_commit(None).unwrap();

        session.fail_commit();

        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.review().unwrap().totals.total_cents, 1500);

        // And the retry path works.
        let draft = session.begin_commit(None).unwrap();
        assert_eq!(draft.lines.len(), 1);
    }

    #[test]
    fn test_cancel_review_returns_to_building() {
        let mut session = reviewed_session();
        session.cancel_review().unwrap();

        assert_eq!(session.phase(), SessionPhase::Building);
        assert_eq!(session.cart().line_count(), 1);
    }

    #[test]
    fn test_restored_session_starts_building() {
        let session = reviewed_session();
        let json = serde_json::to_string(session.cart()).unwrap();
        let restored = CheckoutSession::from_cart(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.phase(), SessionPhase::Building);
        assert_eq!(restored.cart().line_count(), 1);
    }
}
