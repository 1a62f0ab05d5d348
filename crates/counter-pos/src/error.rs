//! # Service Error Type
//!
//! Unified error type for the workflow services.
//!
//! ## Error Flow
//! ```text
//! CoreError (business rule)  ──┐
//!                              ├──► PosError ──► caller
//! DbError (store rejection)  ──┘
//!
//! Checkout adds its own wrapper on top (see checkout::CheckoutError) to
//! distinguish "nothing written" from "partially committed".
//! ```
//!
//! Propagation policy: every failure is reported synchronously to the
//! initiating caller; nothing is retried automatically; nothing is fatal to
//! the process.

use thiserror::Error;

use counter_core::CoreError;
use counter_db::DbError;

/// Service-level error: a business rule violation or a store rejection.
#[derive(Debug, Error)]
pub enum PosError {
    /// Business rule violation (insufficient stock, drawer already open...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store rejection (constraint violation, missing row, lost
    /// connection). Surfaced verbatim, never retried.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<counter_core::ValidationError> for PosError {
    fn from(err: counter_core::ValidationError) -> Self {
        PosError::Core(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type PosResult<T> = Result<T, PosError>;
