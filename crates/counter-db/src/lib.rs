//! # counter-db: Database Layer for Counter POS
//!
//! SQLite storage for the Counter POS system, accessed asynchronously
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! counter-pos service (checkout, ledger, tracker)
//!        │
//!        ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                counter-db (THIS CRATE)                  │
//! │                                                         │
//! │   ┌────────────┐   ┌──────────────┐   ┌─────────────┐  │
//! │   │  Database  │   │ Repositories │   │ Migrations  │  │
//! │   │ (pool.rs)  │◄──│ client       │   │ (embedded)  │  │
//! │   │ SqlitePool │   │ product      │   │ 001_init    │  │
//! │   └────────────┘   │ sale         │   └─────────────┘  │
//! │                    │ installment  │                     │
//! │                    │ register     │                     │
//! │                    └──────────────┘                     │
//! └─────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   SQLite file (WAL mode, foreign keys ON)
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations per aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use counter_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("counter.db")).await?;
//! let products = db.products().list().await?;
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
pub use repository::client::ClientRepository;
pub use repository::installment::{InstallmentFilter, InstallmentRepository, InstallmentRow};
pub use repository::product::ProductRepository;
pub use repository::register::RegisterRepository;
pub use repository::sale::SaleRepository;
