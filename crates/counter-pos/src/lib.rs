//! # counter-pos: Workflow Services for Counter POS
//!
//! The orchestration layer of Counter POS. Where counter-core knows the
//! rules and counter-db knows the SQL, this crate runs the workflows that
//! span aggregates:
//!
//! - [`checkout`] - the checkout orchestrator: cart + client + payment
//!   choice in, sale + lines + schedule + stock debits + ledger entry out
//! - [`register`] - the cash register ledger: one open drawer per operator,
//!   signed transactions, close-with-snapshot
//! - [`installments`] - the installment tracker: grouped listings and the
//!   paid transition feeding the ledger
//!
//! ## Consistency Model
//! ```text
//! checkout step:   1.sale  2.lines  3.schedule  4.stock  5.receipt  6.ledger
//!                     │        │        │          │         │         │
//!                     ▼        ▼        ▼          ▼         ▼         ▼
//!                  commit   commit   commit     commit    (pure)    commit
//!
//! Each step is an independent store round trip; there is no transaction
//! spanning them. A failure after step 1 is reported as
//! CheckoutError::Partial naming the stage and the committed sale, never
//! silently swallowed and never rolled back.
//! ```
//!
//! Every service call takes the acting operator as an explicit
//! `operator_id` parameter. There is no ambient "current user" anywhere.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod installments;
pub mod register;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{
    CheckoutError, CheckoutReceipt, CheckoutService, CheckoutStage, PartialCheckout,
};
pub use error::{PosError, PosResult};
pub use installments::{ClientInstallments, InstallmentTracker, PaidInstallment};
pub use register::{ClosedRegister, RegisterLedger};
