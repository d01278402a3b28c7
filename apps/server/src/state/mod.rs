//! # Server State
//!
//! Shared state injected into every handler via `axum::extract::State`.

pub mod session;

pub use session::SessionState;

use caixa_db::Database;

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pool + repositories).
    pub db: Database,

    /// This terminal's checkout session.
    pub session: SessionState,

    /// Terminal identifier, keys the cart snapshot.
    pub terminal_id: String,
}

impl AppState {
    pub fn new(db: Database, session: SessionState, terminal_id: impl Into<String>) -> Self {
        AppState {
            db,
            session,
            terminal_id: terminal_id.into(),
        }
    }
}
