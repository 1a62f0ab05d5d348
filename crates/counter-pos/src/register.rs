//! # Cash Register Ledger
//!
//! The per-operator drawer state machine and its signed transaction ledger.
//!
//! ## State Machine
//! ```text
//!            open(initial)                      close()
//!   closed ────────────────► open ──────────────────────────► closed
//!            │                │                                │
//!            ▼                ▼                                ▼
//!      register row     sale / installment /            closing entry =
//!      + opening entry  deposit / withdrawal            computed balance,
//!                       entries append                  final_balance set
//! ```
//!
//! Balance = Σ (kind = withdrawal ? -amount : +amount) over the register's
//! entries. The closing entry is recorded as a positive row equal to the
//! computed balance, so it only exists after close and never moves a live
//! balance; `final_balance_cents` on the register row is the authoritative
//! closed snapshot.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use counter_core::{
    validation, CashRegister, CashTransaction, CoreError, Money, RegisterStatus, TransactionKind,
};
use counter_db::{Database, DbError};

use crate::error::PosResult;

// =============================================================================
// Outcome Types
// =============================================================================

/// What closing a drawer produced.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedRegister {
    /// The register row, now closed with its final balance snapshot.
    pub register: CashRegister,
    /// The closing entry, equal to the balance computed just before it.
    pub closing_entry: CashTransaction,
}

// =============================================================================
// Service
// =============================================================================

/// The cash register ledger service.
///
/// Every call takes the acting operator explicitly; drawer lookups always
/// go through the operator's open register.
#[derive(Debug, Clone)]
pub struct RegisterLedger {
    db: Database,
}

impl RegisterLedger {
    /// Creates a new RegisterLedger over a database handle.
    pub fn new(db: Database) -> Self {
        RegisterLedger { db }
    }

    /// Opens a drawer for the operator.
    ///
    /// Creates the register row and an `opening` entry equal to the initial
    /// balance.
    ///
    /// ## Errors
    /// - `CoreError::RegisterAlreadyOpen` when the operator already has an
    ///   open drawer (explicit precondition check; the store's partial
    ///   unique index refuses the concurrent-open race the check misses)
    /// - validation error for a negative initial balance
    pub async fn open(&self, operator_id: &str, initial_balance: Money) -> PosResult<CashRegister> {
        validation::validate_initial_balance(initial_balance.cents())?;

        if self
            .db
            .registers()
            .find_open_for_operator(operator_id)
            .await?
            .is_some()
        {
            return Err(CoreError::RegisterAlreadyOpen {
                operator_id: operator_id.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let register = CashRegister {
            id: Uuid::new_v4().to_string(),
            operator_id: operator_id.to_string(),
            status: RegisterStatus::Open,
            initial_balance_cents: initial_balance.cents(),
            final_balance_cents: None,
            opened_at: now,
            closed_at: None,
        };
        self.db.registers().insert(&register).await?;

        let opening = CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: register.id.clone(),
            sale_id: None,
            installment_id: None,
            description: "Opening balance".to_string(),
            amount_cents: initial_balance.cents(),
            kind: TransactionKind::Opening,
            created_at: now,
        };
        self.db.registers().insert_transaction(&opening).await?;

        info!(
            register_id = %register.id,
            operator = %operator_id,
            initial = %initial_balance,
            "register opened"
        );
        Ok(register)
    }

    /// The operator's open drawer, if any.
    pub async fn find_open(&self, operator_id: &str) -> PosResult<Option<CashRegister>> {
        Ok(self
            .db
            .registers()
            .find_open_for_operator(operator_id)
            .await?)
    }

    /// The register's running balance under the ledger sign convention.
    ///
    /// Includes the opening entry and every sale, installment payment,
    /// deposit, and withdrawal recorded so far.
    pub async fn current_balance(&self, register_id: &str) -> PosResult<Money> {
        let cents = self.db.registers().balance_cents(register_id).await?;
        Ok(Money::from_cents(cents))
    }

    /// Records a cash deposit into the operator's open drawer.
    pub async fn deposit(
        &self,
        operator_id: &str,
        amount: Money,
        description: &str,
    ) -> PosResult<CashTransaction> {
        self.append_movement(operator_id, amount, description, TransactionKind::Deposit)
            .await
    }

    /// Records a cash withdrawal from the operator's open drawer.
    ///
    /// Withdrawals are the only entries subtracted from the balance.
    pub async fn withdraw(
        &self,
        operator_id: &str,
        amount: Money,
        description: &str,
    ) -> PosResult<CashTransaction> {
        self.append_movement(operator_id, amount, description, TransactionKind::Withdrawal)
            .await
    }

    async fn append_movement(
        &self,
        operator_id: &str,
        amount: Money,
        description: &str,
        kind: TransactionKind,
    ) -> PosResult<CashTransaction> {
        validation::validate_cash_amount(amount.cents())?;

        let register = self.require_open(operator_id).await?;

        let entry = CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: register.id,
            sale_id: None,
            installment_id: None,
            description: description.to_string(),
            amount_cents: amount.cents(),
            kind,
            created_at: Utc::now(),
        };
        self.db.registers().insert_transaction(&entry).await?;

        debug!(kind = kind.as_str(), amount = %amount, "cash movement recorded");
        Ok(entry)
    }

    /// Closes the operator's open drawer.
    ///
    /// Computes the balance, writes a `closing` entry of that same amount,
    /// then marks the register closed with the balance as its final
    /// snapshot.
    pub async fn close(&self, operator_id: &str) -> PosResult<ClosedRegister> {
        let register = self.require_open(operator_id).await?;

        let balance = self.db.registers().balance_cents(&register.id).await?;

        let closing_entry = CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: register.id.clone(),
            sale_id: None,
            installment_id: None,
            description: "Closing balance".to_string(),
            amount_cents: balance,
            kind: TransactionKind::Closing,
            created_at: Utc::now(),
        };
        self.db.registers().insert_transaction(&closing_entry).await?;
        self.db.registers().close(&register.id, balance).await?;

        let register = self
            .db
            .registers()
            .get_by_id(&register.id)
            .await?
            .ok_or_else(|| DbError::not_found("Register", &register.id))?;

        info!(
            register_id = %register.id,
            operator = %operator_id,
            final_balance = %balance,
            "register closed"
        );
        Ok(ClosedRegister {
            register,
            closing_entry,
        })
    }

    /// The register's ledger in chronological order.
    pub async fn transactions(&self, register_id: &str) -> PosResult<Vec<CashTransaction>> {
        Ok(self.db.registers().list_transactions(register_id).await?)
    }

    /// One-shot backfill for sale-linked entries persisted with amount
    /// zero. Run once at upgrade; returns the number of rows repaired.
    pub async fn repair_zero_sale_amounts(&self) -> PosResult<u64> {
        Ok(self.db.registers().repair_zero_sale_amounts().await?)
    }

    async fn require_open(&self, operator_id: &str) -> PosResult<CashRegister> {
        self.db
            .registers()
            .find_open_for_operator(operator_id)
            .await?
            .ok_or_else(|| {
                CoreError::NoOpenRegister {
                    operator_id: operator_id.to_string(),
                }
                .into()
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PosError;
    use counter_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sale_entry(register_id: &str, amount_cents: i64) -> CashTransaction {
        CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            sale_id: None,
            installment_id: None,
            description: "Sale".to_string(),
            amount_cents,
            kind: TransactionKind::Sale,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_open_records_the_opening_entry() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let register = ledger.open("op-1", Money::from_cents(10000)).await.unwrap();

        assert!(register.is_open());
        assert_eq!(
            ledger.current_balance(&register.id).await.unwrap(),
            Money::from_cents(10000)
        );

        let entries = ledger.transactions(&register.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, TransactionKind::Opening);
        assert_eq!(entries[0].amount_cents, 10000);
    }

    #[tokio::test]
    async fn test_second_open_is_rejected() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        ledger.open("op-1", Money::zero()).await.unwrap();
        let err = ledger.open("op-1", Money::zero()).await.unwrap_err();

        assert!(matches!(
            err,
            PosError::Core(CoreError::RegisterAlreadyOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_initial_balance_is_rejected() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let err = ledger.open("op-1", Money::from_cents(-1)).await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));
    }

    /// Open with 100.00, record a 50.00 sale and a 20.00 withdrawal:
    /// the balance must be 130.00.
    #[tokio::test]
    async fn test_balance_scenario() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let register = ledger.open("op-1", Money::from_cents(10000)).await.unwrap();
        db.registers()
            .insert_transaction(&sale_entry(&register.id, 5000))
            .await
            .unwrap();
        ledger
            .withdraw("op-1", Money::from_cents(2000), "Supplier payment")
            .await
            .unwrap();

        assert_eq!(
            ledger.current_balance(&register.id).await.unwrap(),
            Money::from_cents(13000)
        );
    }

    #[tokio::test]
    async fn test_close_snapshots_the_balance() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let register = ledger.open("op-1", Money::from_cents(10000)).await.unwrap();
        ledger
            .deposit("op-1", Money::from_cents(500), "Change float")
            .await
            .unwrap();

        let closed = ledger.close("op-1").await.unwrap();

        // The closing entry equals the balance computed just before it.
        assert_eq!(closed.closing_entry.kind, TransactionKind::Closing);
        assert_eq!(closed.closing_entry.amount_cents, 10500);
        assert_eq!(closed.register.status, RegisterStatus::Closed);
        assert_eq!(closed.register.final_balance_cents, Some(10500));
        assert_eq!(closed.register.id, register.id);

        // The drawer is gone: movements are refused until a new open.
        let err = ledger
            .deposit("op-1", Money::from_cents(100), "Late deposit")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::NoOpenRegister { .. })
        ));

        // And a fresh shift can start.
        ledger.open("op-1", Money::from_cents(10500)).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_without_open_register_is_rejected() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let err = ledger.close("op-1").await.unwrap_err();
        assert!(matches!(
            err,
            PosError::Core(CoreError::NoOpenRegister { .. })
        ));
    }

    #[tokio::test]
    async fn test_movements_validate_the_amount() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());
        ledger.open("op-1", Money::zero()).await.unwrap();

        let err = ledger
            .withdraw("op-1", Money::zero(), "Nothing")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));

        let err = ledger
            .deposit("op-1", Money::from_cents(-5), "Negative")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_operators_have_independent_drawers() {
        let db = test_db().await;
        let ledger = RegisterLedger::new(db.clone());

        let first = ledger.open("op-1", Money::from_cents(1000)).await.unwrap();
        let second = ledger.open("op-2", Money::from_cents(2000)).await.unwrap();

        ledger
            .deposit("op-2", Money::from_cents(300), "Float")
            .await
            .unwrap();

        assert_eq!(
            ledger.current_balance(&first.id).await.unwrap(),
            Money::from_cents(1000)
        );
        assert_eq!(
            ledger.current_balance(&second.id).await.unwrap(),
            Money::from_cents(2300)
        );
    }
}
