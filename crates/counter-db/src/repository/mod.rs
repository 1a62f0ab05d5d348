//! # Repository Module
//!
//! Database repository implementations for Counter POS, one per aggregate.
//!
//! Each repository wraps a cloned `SqlitePool` and isolates the SQL for its
//! aggregate behind a typed API; the service crate never sees a query
//! string. Multi-row writes that must land together (a sale's lines, an
//! installment schedule) run inside a single transaction, but no repository
//! spans more than one aggregate: cross-aggregate consistency is the
//! service layer's explicit concern.
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`] - client book CRUD and search
//! - [`product::ProductRepository`] - catalog CRUD, code generation, stock
//! - [`sale::SaleRepository`] - immutable sales and their lines
//! - [`installment::InstallmentRepository`] - schedules and transitions
//! - [`register::RegisterRepository`] - drawers and the ledger

pub mod client;
pub mod installment;
pub mod product;
pub mod register;
pub mod sale;
