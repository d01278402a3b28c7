//! # Session State
//!
//! The one `CheckoutSession` this terminal owns, behind a mutex.
//!
//! ## Locking Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE LOCK IS NEVER HELD ACROSS AN AWAIT                                │
//! │                                                                         │
//! │  Handlers follow the pattern:                                          │
//! │                                                                         │
//! │    1. await whatever DB reads they need (no lock)                      │
//! │    2. lock, mutate the session synchronously, clone what they need,   │
//! │       unlock  ← all inside with()                                      │
//! │    3. await DB writes (no lock)                                        │
//! │    4. lock again to settle the outcome (commit success/failure)        │
//! │                                                                         │
//! │  A std::sync::Mutex is therefore enough - and faster than an async    │
//! │  one. The Committing phase guard inside the session handles the        │
//! │  window between steps 2 and 4.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use caixa_core::{Cart, CheckoutSession};

/// Handle to the terminal's checkout session.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Mutex<CheckoutSession>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh session with an empty cart.
    pub fn new() -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(CheckoutSession::new())),
        }
    }

    /// Restores a session from a persisted cart snapshot.
    pub fn restore(cart: Cart) -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(CheckoutSession::from_cart(cart))),
        }
    }

    /// Runs a closure under the session lock.
    ///
    /// The closure is synchronous by construction, which is what keeps the
    /// lock from ever spanning an await point.
    pub fn with<R>(&self, f: impl FnOnce(&mut CheckoutSession) -> R) -> R {
        let mut session = self.inner.lock().expect("session mutex poisoned");
        f(&mut session)
    }

    /// Clones the current cart (for snapshots and the cart view).
    pub fn cart_clone(&self) -> Cart {
        self.with(|session| session.cart().clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
