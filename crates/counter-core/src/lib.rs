//! # counter-core: Pure Business Logic for Counter POS
//!
//! This crate is the heart of Counter POS. It contains the business rules
//! as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 counter-pos (services)                          │
//! │     checkout orchestration, register ledger, installments       │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼─────────────────────────────────────┐
//! │               ★ counter-core (THIS CRATE) ★                     │
//! │                                                                 │
//! │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ │
//! │   │  money  │ │  types  │ │  cart   │ │ schedule │ │validation│ │
//! │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘ │
//! │                                                                 │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼─────────────────────────────────────┐
//! │                  counter-db (SQLite layer)                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Product, Sale, Installment, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Stock-bounded in-memory cart
//! - [`schedule`] - Installment schedule builder
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output
//! 2. **No I/O**: database, network, and file access are forbidden here
//! 3. **Integer money**: all monetary values are cents (i64)
//! 4. **Explicit errors**: typed error enums, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use schedule::{plan_installments, PlannedInstallment};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days between consecutive installment due dates.
///
/// Installment k of a sale falls due `30 × k` days after checkout.
pub const INSTALLMENT_INTERVAL_DAYS: i64 = 30;

/// Maximum number of installments a sale can be split into.
///
/// Keeps data entry mistakes (e.g. typing 300 instead of 3) from producing
/// a decades-long schedule.
pub const MAX_INSTALLMENT_COUNT: u32 = 48;

/// Length of the short sale reference used in ledger descriptions.
pub const SALE_REF_LEN: usize = 8;
