//! # Cash Register Repository
//!
//! Database operations for register drawers and their ledgers.
//!
//! ## Ledger Convention
//! ```text
//! balance = Σ over the register's transactions of
//!           (kind = withdrawal ? -amount : +amount)
//!
//! Opening entries add. Deposits add. Sale and installment payments add.
//! The closing entry records the computed balance as a positive row at
//! close time, so it never affects a live balance and a closed ledger's
//! sum double-counts the final snapshot. The register row's
//! final_balance_cents is the authoritative closed value.
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use counter_core::{CashRegister, CashTransaction};

use crate::error::{DbError, DbResult};

/// Repository for cash register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Inserts a register row.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the operator already has an open
    /// register: the partial unique index refuses the concurrent-open race
    /// that the service's precondition lookup cannot see.
    pub async fn insert(&self, register: &CashRegister) -> DbResult<()> {
        debug!(id = %register.id, operator = %register.operator_id, "inserting cash register");

        sqlx::query(
            r#"
            INSERT INTO cash_registers (
                id, operator_id, status,
                initial_balance_cents, final_balance_cents,
                opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&register.id)
        .bind(&register.operator_id)
        .bind(register.status)
        .bind(register.initial_balance_cents)
        .bind(register.final_balance_cents)
        .bind(register.opened_at)
        .bind(register.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            SELECT id, operator_id, status,
                   initial_balance_cents, final_balance_cents,
                   opened_at, closed_at
            FROM cash_registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Finds the operator's open register, if any.
    ///
    /// The service's explicit precondition check before opening a new
    /// drawer, and the lookup every ledger write goes through.
    pub async fn find_open_for_operator(&self, operator_id: &str) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            SELECT id, operator_id, status,
                   initial_balance_cents, final_balance_cents,
                   opened_at, closed_at
            FROM cash_registers
            WHERE operator_id = ?1 AND status = 'open'
            "#,
        )
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Marks a register closed with its final balance snapshot.
    ///
    /// Conditional on the register still being open; a second close is
    /// refused as NotFound rather than overwriting the snapshot.
    pub async fn close(&self, id: &str, final_balance_cents: i64) -> DbResult<()> {
        debug!(id = %id, final_balance = %final_balance_cents, "closing cash register");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_registers
            SET status = 'closed', final_balance_cents = ?2, closed_at = ?3
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(final_balance_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open register", id));
        }

        Ok(())
    }

    /// Appends a ledger entry. Entries are never mutated afterwards; the
    /// only exception is the explicit zero-amount repair below.
    pub async fn insert_transaction(&self, transaction: &CashTransaction) -> DbResult<()> {
        debug!(
            register = %transaction.register_id,
            kind = transaction.kind.as_str(),
            amount = %transaction.amount_cents,
            "appending cash transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_transactions (
                id, register_id, sale_id, installment_id,
                description, amount_cents, kind, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.register_id)
        .bind(&transaction.sale_id)
        .bind(&transaction.installment_id)
        .bind(&transaction.description)
        .bind(transaction.amount_cents)
        .bind(transaction.kind)
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists a register's ledger in chronological order.
    pub async fn list_transactions(&self, register_id: &str) -> DbResult<Vec<CashTransaction>> {
        let transactions = sqlx::query_as::<_, CashTransaction>(
            r#"
            SELECT id, register_id, sale_id, installment_id,
                   description, amount_cents, kind, created_at
            FROM cash_transactions
            WHERE register_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Computes the register's balance with the ledger sign convention.
    pub async fn balance_cents(&self, register_id: &str) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN kind = 'withdrawal' THEN -amount_cents ELSE amount_cents END
            ), 0)
            FROM cash_transactions
            WHERE register_id = ?1
            "#,
        )
        .bind(register_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// One-shot backfill for the legacy zero-amount defect: sale-linked
    /// entries persisted with amount 0 are rewritten from the owning sale's
    /// total. Run once at upgrade, never on a read path. Returns the number
    /// of rows repaired.
    pub async fn repair_zero_sale_amounts(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE cash_transactions
            SET amount_cents = (
                SELECT s.total_cents FROM sales s WHERE s.id = cash_transactions.sale_id
            )
            WHERE amount_cents = 0 AND sale_id IS NOT NULL
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!(count = result.rows_affected(), "repaired zero-amount sale entries");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
