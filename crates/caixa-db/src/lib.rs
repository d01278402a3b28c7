//! # caixa-db: Database Layer for Caixa POS
//!
//! All SQLite access for the POS lives in this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caixa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │    │ 001_init.sql │  │   │
//! │  │   │ WAL, FK on    │    │ CartSnapshots  │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (caixa.db)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (product, sale, cart snapshot)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./caixa.db")).await?;
//! let product = db.products().get_by_barcode("7894900011517").await?;
//! let sale = db.sales().commit(&draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart_snapshot::CartSnapshotRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
