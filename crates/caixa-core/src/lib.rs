//! # Caixa Core
//!
//! Pure business logic for Caixa POS. **No I/O lives here** - no database,
//! no network, no filesystem, no clocks beyond timestamping cart lines.
//!
//! ## Module Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          caixa-core                                     │
//! │                                                                         │
//! │  money     Money newtype: integer centavos, no floats ever             │
//! │  types     Product, Sale, SaleItem, PaymentMethod, DailyReport         │
//! │  error     CoreError / ValidationError (thiserror)                     │
//! │  cart      Cart + CartLine: the in-progress basket                     │
//! │  checkout  Totals, discount validation, cash change                    │
//! │  session   CheckoutSession state machine (Building → Reviewing →       │
//! │            Committing) and the CommitDraft handed to the DB layer      │
//! │                                                                         │
//! │  Everything is unit-testable without mocks.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod session;
pub mod types;

// Re-export the types callers reach for constantly.
pub use cart::{Cart, CartLine, MAX_CART_LINES, MAX_LINE_QUANTITY};
pub use checkout::{compute_change, compute_totals, settle_payment, CheckoutTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{CheckoutSession, CommitDraft, ReviewedCheckout, SessionPhase};
pub use types::{
    DailyReport, PaymentMethod, PaymentMethodTotal, Product, Sale, SaleItem, SaleStatus,
};
