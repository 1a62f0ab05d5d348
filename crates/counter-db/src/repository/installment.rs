//! # Installment Repository
//!
//! Database operations for installment schedules.
//!
//! A schedule is inserted as one batch when its sale is checked out, and
//! individual installments move `pending → paid` through a conditional
//! transition. The `pending → overdue` sweep is owned by an external
//! scheduler; [`InstallmentRepository::mark_overdue_up_to`] is the hook it
//! calls, and nothing in this system invokes it on a read path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use counter_core::{Installment, InstallmentStatus, SettlementMethod};

use crate::error::{DbError, DbResult};

// =============================================================================
// Filter & Row Types
// =============================================================================

/// Filter for the tracker's open-installment listing.
///
/// All fields are optional and combine with AND. The "due today" view
/// passes today's date explicitly in `due_on`; there is no ambient clock in
/// the query layer.
#[derive(Debug, Clone, Default)]
pub struct InstallmentFilter {
    /// Client name substring.
    pub search: Option<String>,
    /// Pin a specific status. When unset, paid installments are excluded
    /// and pending/overdue are returned.
    pub status: Option<InstallmentStatus>,
    /// Only installments due on this date.
    pub due_on: Option<NaiveDate>,
}

/// An installment joined with its client, the unit of the tracker listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InstallmentRow {
    pub id: String,
    pub sale_id: String,
    pub number: i64,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<SettlementMethod>,
    pub client_id: String,
    pub client_name: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for installment database operations.
#[derive(Debug, Clone)]
pub struct InstallmentRepository {
    pool: SqlitePool,
}

impl InstallmentRepository {
    /// Creates a new InstallmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InstallmentRepository { pool }
    }

    /// Inserts a whole schedule in one transaction.
    pub async fn insert_batch(&self, installments: &[Installment]) -> DbResult<()> {
        debug!(count = installments.len(), "inserting installment schedule");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    id, sale_id, number, due_date, amount_cents,
                    status, paid_at, payment_method
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&installment.id)
            .bind(&installment.sale_id)
            .bind(installment.number)
            .bind(installment.due_date)
            .bind(installment.amount_cents)
            .bind(installment.status)
            .bind(installment.paid_at)
            .bind(installment.payment_method)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets an installment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Installment>> {
        let installment = sqlx::query_as::<_, Installment>(
            r#"
            SELECT id, sale_id, number, due_date, amount_cents,
                   status, paid_at, payment_method
            FROM installments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(installment)
    }

    /// Gets a sale's schedule ordered by ordinal.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<Installment>> {
        let installments = sqlx::query_as::<_, Installment>(
            r#"
            SELECT id, sale_id, number, due_date, amount_cents,
                   status, paid_at, payment_method
            FROM installments
            WHERE sale_id = ?1
            ORDER BY number
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    /// The tracker listing: installments joined with their clients,
    /// filtered, ordered by client name then due date then ordinal.
    pub async fn list_open(&self, filter: &InstallmentFilter) -> DbResult<Vec<InstallmentRow>> {
        let mut sql = String::from(
            r#"
            SELECT i.id, i.sale_id, i.number, i.due_date, i.amount_cents,
                   i.status, i.paid_at, i.payment_method,
                   c.id AS client_id, c.name AS client_name
            FROM installments i
            JOIN sales s ON s.id = i.sale_id
            JOIN clients c ON c.id = s.client_id
            WHERE 1 = 1
            "#,
        );

        if filter.status.is_some() {
            sql.push_str(" AND i.status = ?");
        } else {
            sql.push_str(" AND i.status != 'paid'");
        }
        if filter.due_on.is_some() {
            sql.push_str(" AND i.due_date = ?");
        }
        if filter.search.is_some() {
            sql.push_str(" AND c.name LIKE ?");
        }
        // c.id keeps two same-named clients from interleaving in the
        // grouped listing.
        sql.push_str(" ORDER BY c.name, c.id, i.due_date, i.number");

        let mut query = sqlx::query_as::<_, InstallmentRow>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(due_on) = filter.due_on {
            query = query.bind(due_on);
        }
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", search.trim()));
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows)
    }

    /// The paid transition.
    ///
    /// Conditional on the installment not being paid already, so a repeated
    /// call cannot overwrite the original settlement. Returns whether a row
    /// changed.
    pub async fn mark_paid(
        &self,
        id: &str,
        paid_at: DateTime<Utc>,
        method: SettlementMethod,
    ) -> DbResult<bool> {
        debug!(id = %id, method = method.as_str(), "marking installment paid");

        let result = sqlx::query(
            r#"
            UPDATE installments
            SET status = 'paid', paid_at = ?2, payment_method = ?3
            WHERE id = ?1 AND status != 'paid'
            "#,
        )
        .bind(id)
        .bind(paid_at)
        .bind(method)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// The external scheduler's hook: sweeps pending installments whose due
    /// date passed before `today` to overdue. Returns the number of rows
    /// transitioned.
    pub async fn mark_overdue_up_to(&self, today: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET status = 'overdue'
            WHERE status = 'pending' AND due_date < ?1
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;

        debug!(count = result.rows_affected(), "swept overdue installments");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
