//! # Caixa Server
//!
//! The HTTP layer of Caixa POS: an axum router over the checkout session
//! and the database.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         caixa-server                                    │
//! │                                                                         │
//! │  routes/    HTTP handlers + request/response DTOs                       │
//! │  state/     AppState, the terminal's CheckoutSession behind a mutex    │
//! │  error      ApiError: CoreError/DbError → status + JSON envelope        │
//! │  config     environment-driven ServerConfig                             │
//! │                                                                         │
//! │  Handlers orchestrate only: business rules live in caixa-core,         │
//! │  queries in caixa-db.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate is a library so integration tests can drive the router
//! in-process with `tower::ServiceExt::oneshot`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, SessionState};
