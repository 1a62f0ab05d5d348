//! # Installment Tracker
//!
//! Lists scheduled future payments grouped by client and performs the paid
//! transition, feeding the cash register ledger when a drawer is open.
//!
//! The grouping is recomputed on demand from a single joined query; nothing
//! is cached or materialized. The `pending → overdue` sweep is owned by an
//! external scheduler (see the repository's `mark_overdue_up_to` hook) and
//! never runs here.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use counter_core::{
    CashTransaction, CoreError, Installment, InstallmentStatus, Money, SettlementMethod,
    TransactionKind,
};
use counter_db::{Database, DbError, InstallmentFilter, InstallmentRow};

use crate::error::PosResult;

// =============================================================================
// Outcome Types
// =============================================================================

/// One client's slice of the tracker listing.
#[derive(Debug, Clone, Serialize)]
pub struct ClientInstallments {
    pub client_id: String,
    pub client_name: String,
    /// The client's open installments, ordered by due date then ordinal.
    pub installments: Vec<InstallmentRow>,
    /// Sum of the client's pending amounts.
    pub pending_cents: i64,
    /// Sum of the client's overdue amounts.
    pub overdue_cents: i64,
}

impl ClientInstallments {
    /// Pending total as Money.
    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_cents(self.pending_cents)
    }

    /// Overdue total as Money.
    #[inline]
    pub fn overdue(&self) -> Money {
        Money::from_cents(self.overdue_cents)
    }
}

/// What the paid transition produced.
#[derive(Debug, Clone, Serialize)]
pub struct PaidInstallment {
    pub installment: Installment,
    /// Present iff the operator had an open drawer.
    pub ledger_entry: Option<CashTransaction>,
}

// =============================================================================
// Service
// =============================================================================

/// The installment tracker service.
#[derive(Debug, Clone)]
pub struct InstallmentTracker {
    db: Database,
}

impl InstallmentTracker {
    /// Creates a new InstallmentTracker over a database handle.
    pub fn new(db: Database) -> Self {
        InstallmentTracker { db }
    }

    /// Open installments grouped by client, groups sorted by client name
    /// ascending, each carrying its pending and overdue sums.
    ///
    /// The "due today" view passes today's date in the filter's `due_on`;
    /// there is no ambient clock here.
    pub async fn list_grouped_by_client(
        &self,
        filter: &InstallmentFilter,
    ) -> PosResult<Vec<ClientInstallments>> {
        let rows = self.db.installments().list_open(filter).await?;

        let mut groups: Vec<ClientInstallments> = Vec::new();
        for row in rows {
            let start_new_group = groups
                .last()
                .map(|group| group.client_id != row.client_id)
                .unwrap_or(true);
            if start_new_group {
                groups.push(ClientInstallments {
                    client_id: row.client_id.clone(),
                    client_name: row.client_name.clone(),
                    installments: Vec::new(),
                    pending_cents: 0,
                    overdue_cents: 0,
                });
            }

            // The unwrap cannot fail: a group was just pushed if none matched.
            let group = groups.last_mut().unwrap();
            match row.status {
                InstallmentStatus::Pending => group.pending_cents += row.amount_cents,
                InstallmentStatus::Overdue => group.overdue_cents += row.amount_cents,
                InstallmentStatus::Paid => {}
            }
            group.installments.push(row);
        }

        debug!(groups = groups.len(), "tracker listing computed");
        Ok(groups)
    }

    /// The paid transition.
    ///
    /// Marks the installment paid and, if the operator has an open drawer,
    /// appends an `installment_payment` ledger entry. The recorded
    /// timestamp combines the chosen payment date with the current
    /// wall-clock time of day: back-dating moves the date, not the
    /// intra-day ordering of the ledger.
    ///
    /// ## Errors
    /// - `DbError::NotFound` for an unknown installment
    /// - `CoreError::InstallmentAlreadyPaid` on a repeated transition
    pub async fn mark_paid(
        &self,
        installment_id: &str,
        payment_date: NaiveDate,
        method: SettlementMethod,
        operator_id: &str,
    ) -> PosResult<PaidInstallment> {
        let mut installment = self
            .db
            .installments()
            .get_by_id(installment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Installment", installment_id))?;

        if installment.is_paid() {
            return Err(CoreError::InstallmentAlreadyPaid {
                id: installment_id.to_string(),
            }
            .into());
        }

        let paid_at = payment_date.and_time(Utc::now().time()).and_utc();

        let changed = self
            .db
            .installments()
            .mark_paid(installment_id, paid_at, method)
            .await?;
        if !changed {
            // Raced with another settlement between the read and the write.
            return Err(CoreError::InstallmentAlreadyPaid {
                id: installment_id.to_string(),
            }
            .into());
        }

        installment.status = InstallmentStatus::Paid;
        installment.paid_at = Some(paid_at);
        installment.payment_method = Some(method);

        let ledger_entry = if let Some(register) = self
            .db
            .registers()
            .find_open_for_operator(operator_id)
            .await?
        {
            let sale = self
                .db
                .sales()
                .get_by_id(&installment.sale_id)
                .await?
                .ok_or_else(|| DbError::not_found("Sale", &installment.sale_id))?;
            let client = self
                .db
                .clients()
                .get_by_id(&sale.client_id)
                .await?
                .ok_or_else(|| DbError::not_found("Client", &sale.client_id))?;

            let entry = CashTransaction {
                id: Uuid::new_v4().to_string(),
                register_id: register.id,
                sale_id: Some(sale.id.clone()),
                installment_id: Some(installment.id.clone()),
                description: format!("Installment #{} - {}", installment.number, client.name),
                amount_cents: installment.amount_cents,
                kind: TransactionKind::InstallmentPayment,
                created_at: paid_at,
            };
            self.db.registers().insert_transaction(&entry).await?;
            Some(entry)
        } else {
            debug!(operator = %operator_id, "no open register, installment settled off-ledger");
            None
        };

        info!(
            installment_id = %installment.id,
            amount = %installment.amount(),
            method = method.as_str(),
            ledger = ledger_entry.is_some(),
            "installment paid"
        );
        Ok(PaidInstallment {
            installment,
            ledger_entry,
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
    use crate::register::RegisterLedger;
    use counter_core::{Client, Sale};
    use counter_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Inserts a client, a sale, and a schedule; returns the installment ids.
    async fn seed_schedule(
        db: &Database,
        client_name: &str,
        entries: &[(i64, NaiveDate, i64, InstallmentStatus)],
    ) -> (Sale, Vec<String>) {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: client_name.to_string(),
            email: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();

        let total: i64 = entries.iter().map(|(_, _, amount, _)| amount).sum();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            operator_id: "op-1".to_string(),
            total_cents: total,
            payment_tag: format!("installment_x{}", entries.len()),
            created_at: now,
        };
        db.sales().insert_sale(&sale).await.unwrap();

        let batch: Vec<Installment> = entries
            .iter()
            .map(|(number, due, amount, status)| Installment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                number: *number,
                due_date: *due,
                amount_cents: *amount,
                status: *status,
                paid_at: None,
                payment_method: None,
            })
            .collect();
        db.installments().insert_batch(&batch).await.unwrap();

        let ids = batch.into_iter().map(|i| i.id).collect();
        (sale, ids)
    }

    #[tokio::test]
    async fn test_grouped_listing_sums_and_sorting() {
        let db = test_db().await;
        seed_schedule(
            &db,
            "Bruno Reis",
            &[(1, date(2026, 2, 1), 1500, InstallmentStatus::Pending)],
        )
        .await;
        seed_schedule(
            &db,
            "Ana Lima",
            &[
                (1, date(2026, 1, 5), 800, InstallmentStatus::Overdue),
                (2, date(2026, 2, 5), 800, InstallmentStatus::Pending),
                (3, date(2026, 3, 5), 900, InstallmentStatus::Pending),
            ],
        )
        .await;

        let groups = InstallmentTracker::new(db.clone())
            .list_grouped_by_client(&InstallmentFilter::default())
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].client_name, "Ana Lima");
        assert_eq!(groups[0].pending_cents, 1700);
        assert_eq!(groups[0].overdue_cents, 800);
        assert_eq!(groups[0].installments.len(), 3);

        assert_eq!(groups[1].client_name, "Bruno Reis");
        assert_eq!(groups[1].pending_cents, 1500);
        assert_eq!(groups[1].overdue_cents, 0);
    }

    #[tokio::test]
    async fn test_due_on_filter_drives_the_due_today_view() {
        let db = test_db().await;
        seed_schedule(
            &db,
            "Ana Lima",
            &[
                (1, date(2026, 2, 1), 800, InstallmentStatus::Pending),
                (2, date(2026, 3, 1), 800, InstallmentStatus::Pending),
            ],
        )
        .await;

        let groups = InstallmentTracker::new(db.clone())
            .list_grouped_by_client(&InstallmentFilter {
                due_on: Some(date(2026, 2, 1)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].installments.len(), 1);
        assert_eq!(groups[0].installments[0].number, 1);
    }

    #[tokio::test]
    async fn test_mark_paid_with_open_register_feeds_the_ledger() {
        let db = test_db().await;
        let (sale, ids) = seed_schedule(
            &db,
            "Ana Lima",
            &[(2, date(2026, 3, 5), 833, InstallmentStatus::Pending)],
        )
        .await;
        let register = RegisterLedger::new(db.clone())
            .open("op-1", Money::from_cents(5000))
            .await
            .unwrap();

        let payment_date = date(2026, 3, 2);
        let paid = InstallmentTracker::new(db.clone())
            .mark_paid(&ids[0], payment_date, SettlementMethod::Cash, "op-1")
            .await
            .unwrap();

        assert_eq!(paid.installment.status, InstallmentStatus::Paid);
        assert_eq!(
            paid.installment.payment_method,
            Some(SettlementMethod::Cash)
        );
        // Back-dating moves the date, not the time of day.
        assert_eq!(paid.installment.paid_at.unwrap().date_naive(), payment_date);

        let entry = paid.ledger_entry.unwrap();
        assert_eq!(entry.kind, TransactionKind::InstallmentPayment);
        assert_eq!(entry.amount_cents, 833);
        assert_eq!(entry.installment_id.as_deref(), Some(ids[0].as_str()));
        assert_eq!(entry.sale_id.as_deref(), Some(sale.id.as_str()));
        assert_eq!(entry.created_at.date_naive(), payment_date);
        assert!(entry.description.contains("#2"));
        assert!(entry.description.contains("Ana Lima"));

        // The drawer balance moved by the installment amount.
        let balance = RegisterLedger::new(db.clone())
            .current_balance(&register.id)
            .await
            .unwrap();
        assert_eq!(balance, Money::from_cents(5833));
    }

    #[tokio::test]
    async fn test_mark_paid_without_register_settles_off_ledger() {
        let db = test_db().await;
        let (_, ids) = seed_schedule(
            &db,
            "Ana Lima",
            &[(1, date(2026, 2, 5), 800, InstallmentStatus::Pending)],
        )
        .await;

        let paid = InstallmentTracker::new(db.clone())
            .mark_paid(&ids[0], date(2026, 2, 5), SettlementMethod::Transfer, "op-1")
            .await
            .unwrap();

        assert_eq!(paid.installment.status, InstallmentStatus::Paid);
        assert!(paid.ledger_entry.is_none());
    }

    #[tokio::test]
    async fn test_mark_paid_twice_is_rejected() {
        let db = test_db().await;
        let (_, ids) = seed_schedule(
            &db,
            "Ana Lima",
            &[(1, date(2026, 2, 5), 800, InstallmentStatus::Pending)],
        )
        .await;
        let tracker = InstallmentTracker::new(db.clone());

        tracker
            .mark_paid(&ids[0], date(2026, 2, 5), SettlementMethod::Cash, "op-1")
            .await
            .unwrap();
        let err = tracker
            .mark_paid(&ids[0], date(2026, 2, 6), SettlementMethod::Card, "op-1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PosError::Core(CoreError::InstallmentAlreadyPaid { .. })
        ));
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_installment() {
        let db = test_db().await;
        let err = InstallmentTracker::new(db.clone())
            .mark_paid("ghost", date(2026, 2, 5), SettlementMethod::Cash, "op-1")
            .await
            .unwrap_err();

        assert!(matches!(err, PosError::Db(DbError::NotFound { .. })));
    }

    /// An overdue installment can still be settled; the overdue transition
    /// itself belongs to the external sweep, not to this tracker.
    #[tokio::test]
    async fn test_overdue_installment_can_be_paid() {
        let db = test_db().await;
        let (_, ids) = seed_schedule(
            &db,
            "Ana Lima",
            &[(1, date(2026, 1, 5), 800, InstallmentStatus::Overdue)],
        )
        .await;

        let paid = InstallmentTracker::new(db.clone())
            .mark_paid(&ids[0], date(2026, 2, 20), SettlementMethod::Cash, "op-1")
            .await
            .unwrap();

        assert_eq!(paid.installment.status, InstallmentStatus::Paid);
    }
}
