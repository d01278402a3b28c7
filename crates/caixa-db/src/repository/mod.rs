//! # Repository Layer
//!
//! One repository per aggregate, each owning its SQL:
//!
//! - [`product::ProductRepository`] - catalog lookup and stock decrement
//! - [`sale::SaleRepository`] - the transactional committer, listing, reports
//! - [`cart_snapshot::CartSnapshotRepository`] - best-effort cart persistence
//!
//! Repositories are thin: business rules live in caixa-core and are
//! re-validated here only where the database is the source of truth
//! (live stock, commit-time prices, sale numbering).

pub mod cart_snapshot;
pub mod product;
pub mod sale;
