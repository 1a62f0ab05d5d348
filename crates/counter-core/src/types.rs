//! # Domain Types
//!
//! Core domain types used throughout Counter POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │   Client     │   │   Product    │   │     Sale       │
//! │  ──────────  │   │  ──────────  │   │  ────────────  │
//! │  id (UUID)   │◄──│  id (UUID)   │   │  id (UUID)     │
//! │  name        │   │  code (biz)  │   │  client_id     │
//! │  contacts    │   │  price_cents │   │  operator_id   │
//! └──────────────┘   │  stock_qty   │   │  total_cents   │
//!                    └──────────────┘   │  payment_tag   │
//!                                       └───────┬────────┘
//!                              owns (cascade)   │
//!                    ┌──────────────┐   ┌───────▼────────┐
//!                    │ Installment  │◄──┤   SaleLine     │
//!                    └──────────────┘   └────────────────┘
//!
//! ┌──────────────┐ owns ┌──────────────────┐
//! │ CashRegister ├─────►│ CashTransaction  │ (weakly refs Sale/Installment)
//! └──────────────┘      └──────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Entities have an immutable UUID `id` for relations; products also carry a
//! human-readable business `code`, generated once at creation time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Client
// =============================================================================

/// A customer of the store.
///
/// Clients have an independent lifecycle: sales reference them but never own
/// them, and deleting a client with recorded sales is refused by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also the grouping key of the installment tracker.
    pub name: String,

    /// Contact fields.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier, unique, generated once at creation time.
    pub code: String,

    /// Display name shown at the counter and on receipts.
    pub name: String,

    /// Optional category label.
    pub category: Option<String>,

    /// Unit of measure ("un", "kg", "box", ...).
    pub unit: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// On-hand count. Invariant: never negative.
    pub stock_quantity: i64,

    /// Restock threshold; at or below it the product shows up in the
    /// low-stock report.
    pub min_stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can currently be sold.
    pub fn has_stock(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock_quantity >= quantity
    }

    /// True when on-hand stock is at or below the restock threshold.
    pub fn is_below_min_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock
    }
}

// =============================================================================
// Payment Choice
// =============================================================================

/// How the customer pays at checkout.
///
/// Immediate choices (cash, card) settle the whole total at the counter and
/// feed the cash register ledger; the installment choice generates a
/// pending-payment schedule instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum PaymentChoice {
    /// Physical cash. `tendered_cents` is what the customer handed over,
    /// when the counter records it (change = tendered - total).
    Cash { tendered_cents: Option<i64> },
    /// Card payment on an external terminal.
    Card,
    /// Split into `count` equal monthly payments.
    Installments { count: u32 },
}

impl PaymentChoice {
    /// The tag recorded on the sale row.
    ///
    /// Direct methods record their own name; the installment choice records
    /// a composite tag carrying the count, e.g. `installment_x3`.
    pub fn tag(&self) -> String {
        match self {
            PaymentChoice::Cash { .. } => "cash".to_string(),
            PaymentChoice::Card => "card".to_string(),
            PaymentChoice::Installments { count } => format!("installment_x{}", count),
        }
    }

    /// True for choices settled in full at the counter.
    pub fn is_immediate(&self) -> bool {
        !matches!(self, PaymentChoice::Installments { .. })
    }
}

// =============================================================================
// Settlement Method
// =============================================================================

/// How an individual installment was settled when marked paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SettlementMethod {
    Cash,
    Card,
    Transfer,
}

impl SettlementMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementMethod::Cash => "cash",
            SettlementMethod::Card => "card",
            SettlementMethod::Transfer => "transfer",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale.
///
/// Sales are immutable once created: there is no update or delete path, and
/// corrections happen through compensating records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Owning client (referenced, not owned).
    pub client_id: String,
    /// Operator who rang the sale up. Always threaded explicitly, never
    /// ambient state.
    pub operator_id: String,
    /// Authoritative total: the sum of the line items.
    pub total_cents: i64,
    /// Payment method tag (see [`PaymentChoice::tag`]).
    pub payment_tag: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Short reference used in ledger descriptions and receipts.
    pub fn short_ref(&self) -> &str {
        let end = self.id.len().min(crate::SALE_REF_LEN);
        &self.id[..end]
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: the unit price is frozen when the product
/// entered the cart, decoupled from later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at the time the product was added to the cart.
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Installment
// =============================================================================

/// Lifecycle of a scheduled installment.
///
/// `pending → paid` is the only transition this system performs; the
/// `pending → overdue` sweep belongs to an external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "pending",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Overdue => "overdue",
        }
    }
}

/// One scheduled future payment of a sale.
///
/// Owned by the sale (cascade-deleted with it). The whole schedule is
/// inserted as one batch when the sale is checked out with the installment
/// choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Installment {
    pub id: String,
    pub sale_id: String,
    /// Ordinal within the schedule, 1..N, unique per sale.
    pub number: i64,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
    /// Set by the paid transition.
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<SettlementMethod>,
}

impl Installment {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    pub fn is_overdue(&self) -> bool {
        self.status == InstallmentStatus::Overdue
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// Register drawer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Open,
    Closed,
}

/// A per-operator, per-shift cash accounting session.
///
/// Invariant: at most one open register per operator at any time. The
/// service checks the precondition explicitly and the schema backs it with
/// a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashRegister {
    pub id: String,
    pub operator_id: String,
    pub status: RegisterStatus,
    /// Cash in the drawer when the shift opened.
    pub initial_balance_cents: i64,
    /// Balance snapshot taken at close; None while open.
    pub final_balance_cents: Option<i64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashRegister {
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    /// Returns the opening balance as Money.
    #[inline]
    pub fn initial_balance(&self) -> Money {
        Money::from_cents(self.initial_balance_cents)
    }
}

// =============================================================================
// Cash Transaction
// =============================================================================

/// Ledger entry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    InstallmentPayment,
    Opening,
    Closing,
    Withdrawal,
    Deposit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::InstallmentPayment => "installment_payment",
            TransactionKind::Opening => "opening",
            TransactionKind::Closing => "closing",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Deposit => "deposit",
        }
    }

    /// Ledger sign convention: withdrawal is the only kind whose amount is
    /// subtracted from the balance. Every other kind adds, including the
    /// opening entry and the closing snapshot (which is recorded as a
    /// positive amount-typed row, not a negating entry).
    pub fn is_debit(&self) -> bool {
        matches!(self, TransactionKind::Withdrawal)
    }
}

/// One signed entry in a register's ledger.
///
/// Owned by the register (cascade-deleted with it); the sale/installment
/// references are weak lookups, not ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashTransaction {
    pub id: String,
    pub register_id: String,
    pub sale_id: Option<String>,
    pub installment_id: Option<String>,
    pub description: String,
    /// Stored unsigned; the sign is derived from `kind`.
    pub amount_cents: i64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

impl CashTransaction {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// The entry's contribution to the running balance.
    pub fn signed_cents(&self) -> i64 {
        if self.kind.is_debit() {
            -self.amount_cents
        } else {
            self.amount_cents
        }
    }
}

/// Computes a ledger balance from a slice of transactions.
///
/// Mirrors the SQL aggregate the repository uses; kept here so the sign
/// convention is testable without a database.
pub fn balance_cents(transactions: &[CashTransaction]) -> i64 {
    transactions.iter().map(CashTransaction::signed_cents).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
