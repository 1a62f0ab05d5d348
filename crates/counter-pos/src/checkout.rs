//! # Checkout Orchestrator
//!
//! Turns a cart, a client, and a payment choice into a sale with its line
//! items, optional installment schedule, stock decrements, and (when a
//! drawer is open) a cash ledger entry.
//!
//! ## Sequence
//! ```text
//! preconditions (no writes yet)
//!   cart non-empty · client exists · tendered covers total · count valid
//!        │
//!        ▼
//!   1. insert sale            ── failure: CheckoutError::NotStarted
//!   2. insert lines           ──┐
//!   3. insert schedule        ──┤ failure: CheckoutError::Partial
//!   4. debit stock per line   ──┤   { stage, sale_id }  (no rollback;
//!   5. build receipt          ──┤    committed steps stay committed)
//!   6. ledger entry if drawer ──┘
//! ```
//!
//! Each step is an independent store round trip. The absence of a spanning
//! transaction is a deliberate carry-over from the system this replaces;
//! what changed is that partial completion is now explicit in the error
//! type instead of silent.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use counter_core::{
    validation, Cart, CashTransaction, Client, CoreError, Installment, InstallmentStatus,
    PaymentChoice, Sale, SaleLine, TransactionKind,
};
use counter_db::{Database, DbError};

use crate::error::PosError;

// =============================================================================
// Outcome & Error Types
// =============================================================================

/// Everything a successful checkout produced, and the input handed to the
/// receipt renderer (an external collaborator).
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
    /// Empty unless the payment choice was installments.
    pub installments: Vec<Installment>,
    /// Present iff the payment was immediate and a drawer was open.
    pub ledger_entry: Option<CashTransaction>,
    /// Cash to hand back: tendered minus total, zero for other methods.
    pub change_cents: i64,
}

/// The step of the checkout sequence a partial failure is attributed to.
///
/// A failed sale insert is not a stage: nothing was committed yet, and it
/// reports as [`CheckoutError::NotStarted`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    WriteLines,
    ScheduleInstallments,
    DebitStock,
    LedgerEntry,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutStage::WriteLines => "write_lines",
            CheckoutStage::ScheduleInstallments => "schedule_installments",
            CheckoutStage::DebitStock => "debit_stock",
            CheckoutStage::LedgerEntry => "ledger_entry",
        };
        f.write_str(name)
    }
}

/// A checkout failure after the sale row was committed.
///
/// Earlier steps are NOT undone; `stage` and `sale_id` tell the caller
/// exactly what persisted.
#[derive(Debug, Error)]
#[error("checkout halted at the {stage} step; sale {sale_id} and earlier steps stay committed: {source}")]
pub struct PartialCheckout {
    pub stage: CheckoutStage,
    pub sale_id: String,
    #[source]
    pub source: PosError,
}

impl PartialCheckout {
    fn new(stage: CheckoutStage, sale_id: &str, source: impl Into<PosError>) -> Self {
        PartialCheckout {
            stage,
            sale_id: sale_id.to_string(),
            source: source.into(),
        }
    }
}

/// Checkout outcome taxonomy.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A precondition failed; nothing was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The sale row itself could not be created; nothing was written.
    #[error("checkout did not start: {0}")]
    NotStarted(#[from] DbError),

    /// A later step failed after the sale was committed.
    #[error(transparent)]
    Partial(#[from] PartialCheckout),
}

// =============================================================================
// Service
// =============================================================================

/// The checkout orchestrator.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    /// Creates a new CheckoutService over a database handle.
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Runs the checkout sequence.
    ///
    /// ## Postconditions (on success)
    /// - stock quantities reflect the sale
    /// - pending installments exist iff the choice was installments
    /// - a ledger entry exists iff a drawer was open and the payment
    ///   immediate
    ///
    /// ## Errors
    /// See [`CheckoutError`]: rejected before any write, not started, or
    /// partially committed with the stage named.
    pub async fn checkout(
        &self,
        cart: &Cart,
        client_id: &str,
        payment: PaymentChoice,
        operator_id: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        // ---- Preconditions: checked before any write ----------------------
        if client_id.trim().is_empty() {
            return Err(CoreError::MissingClient.into());
        }
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let total = cart.total();

        if let PaymentChoice::Cash {
            tendered_cents: Some(tendered),
        } = payment
        {
            if tendered < total.cents() {
                return Err(CoreError::InsufficientTendered {
                    total_cents: total.cents(),
                    tendered_cents: tendered,
                }
                .into());
            }
        }
        if let PaymentChoice::Installments { count } = payment {
            validation::validate_installment_count(count).map_err(CoreError::from)?;
        }

        let client = self
            .db
            .clients()
            .get_by_id(client_id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", client_id))?;

        debug!(
            client = %client.name,
            operator = %operator_id,
            total = %total,
            tag = %payment.tag(),
            "starting checkout"
        );

        // ---- Step 1: the sale row -----------------------------------------
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            operator_id: operator_id.to_string(),
            total_cents: total.cents(),
            payment_tag: payment.tag(),
            created_at: now,
        };
        self.db.sales().insert_sale(&sale).await?;

        // ---- Step 2: line items, prices from the cart snapshots -----------
        let lines: Vec<SaleLine> = cart
            .lines()
            .iter()
            .map(|line| SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                created_at: now,
            })
            .collect();
        self.db
            .sales()
            .insert_lines(&lines)
            .await
            .map_err(|e| PartialCheckout::new(CheckoutStage::WriteLines, &sale.id, e))?;

        // ---- Step 3: the installment schedule -----------------------------
        let installments = if let PaymentChoice::Installments { count } = payment {
            let plan = counter_core::plan_installments(total, count, now)
                .map_err(|e| PartialCheckout::new(CheckoutStage::ScheduleInstallments, &sale.id, e))?;

            let batch: Vec<Installment> = plan
                .into_iter()
                .map(|planned| Installment {
                    id: Uuid::new_v4().to_string(),
                    sale_id: sale.id.clone(),
                    number: planned.number,
                    due_date: planned.due_date,
                    amount_cents: planned.amount_cents,
                    status: InstallmentStatus::Pending,
                    paid_at: None,
                    payment_method: None,
                })
                .collect();

            self.db
                .installments()
                .insert_batch(&batch)
                .await
                .map_err(|e| {
                    PartialCheckout::new(CheckoutStage::ScheduleInstallments, &sale.id, e)
                })?;
            batch
        } else {
            Vec::new()
        };

        // ---- Step 4: stock debits, one conditional update per line --------
        for line in cart.lines() {
            let debited = self
                .db
                .products()
                .debit_stock(&line.product_id, line.quantity)
                .await
                .map_err(|e| PartialCheckout::new(CheckoutStage::DebitStock, &sale.id, e))?;

            if !debited {
                let available = self
                    .db
                    .products()
                    .get_by_id(&line.product_id)
                    .await
                    .map_err(|e| PartialCheckout::new(CheckoutStage::DebitStock, &sale.id, e))?
                    .map(|p| p.stock_quantity)
                    .unwrap_or(0);

                return Err(PartialCheckout::new(
                    CheckoutStage::DebitStock,
                    &sale.id,
                    CoreError::InsufficientStock {
                        code: line.code.clone(),
                        available,
                        requested: line.quantity,
                    },
                )
                .into());
            }
        }

        // ---- Step 5: receipt input (rendering is external) ----------------
        let change_cents = match payment {
            PaymentChoice::Cash {
                tendered_cents: Some(tendered),
            } => tendered - total.cents(),
            _ => 0,
        };

        // ---- Step 6: ledger entry when a drawer is open -------------------
        let ledger_entry = if payment.is_immediate() {
            self.record_ledger_entry(&sale, &client, payment)
                .await
                .map_err(|e| PartialCheckout::new(CheckoutStage::LedgerEntry, &sale.id, e))?
        } else {
            None
        };

        info!(
            sale_id = %sale.id,
            total = %total,
            lines = lines.len(),
            installments = installments.len(),
            ledger = ledger_entry.is_some(),
            "checkout complete"
        );

        Ok(CheckoutReceipt {
            sale,
            lines,
            installments,
            ledger_entry,
            change_cents,
        })
    }

    /// Writes the sale's drawer entry if the operator has an open register.
    ///
    /// Amount: `min(tendered, total)` for cash with a recorded amount,
    /// otherwise the full total.
    async fn record_ledger_entry(
        &self,
        sale: &Sale,
        client: &Client,
        payment: PaymentChoice,
    ) -> Result<Option<CashTransaction>, DbError> {
        let Some(register) = self
            .db
            .registers()
            .find_open_for_operator(&sale.operator_id)
            .await?
        else {
            debug!(operator = %sale.operator_id, "no open register, skipping ledger entry");
            return Ok(None);
        };

        let amount_cents = match payment {
            PaymentChoice::Cash {
                tendered_cents: Some(tendered),
            } => tendered.min(sale.total_cents),
            _ => sale.total_cents,
        };

        let entry = CashTransaction {
            id: Uuid::new_v4().to_string(),
            register_id: register.id,
            sale_id: Some(sale.id.clone()),
            installment_id: None,
            description: format!("Sale {} - {}", sale.short_ref(), client.name),
            amount_cents,
            kind: TransactionKind::Sale,
            created_at: Utc::now(),
        };
        self.db.registers().insert_transaction(&entry).await?;

        Ok(Some(entry))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterLedger;
    use chrono::Duration;
    use counter_core::{Money, Product};
    use counter_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_client(db: &Database, name: &str) -> Client {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();
        client
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        let repo = db.products();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: repo.next_code().await.unwrap(),
            name: name.to_string(),
            category: None,
            unit: "un".to_string(),
            price_cents,
            stock_quantity: stock,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        };
        repo.insert(&product).await.unwrap();
        product
    }

    fn cart_of(entries: &[(&Product, i64)]) -> Cart {
        let mut cart = Cart::new();
        for &(product, quantity) in entries {
            cart.add_item(product);
            cart.change_quantity(&product.id, quantity - 1);
        }
        cart
    }

    #[tokio::test]
    async fn test_cash_checkout_with_open_register() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let a = seed_product(&db, "Rice 5kg", 1000, 10).await;
        let b = seed_product(&db, "Coffee 500g", 500, 10).await;
        RegisterLedger::new(db.clone())
            .open("op-1", Money::from_cents(10000))
            .await
            .unwrap();

        let cart = cart_of(&[(&a, 2), (&b, 1)]);
        let receipt = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Cash {
                    tendered_cents: Some(3000),
                },
                "op-1",
            )
            .await
            .unwrap();

        assert_eq!(receipt.sale.total_cents, 2500);
        assert_eq!(receipt.sale.payment_tag, "cash");
        assert_eq!(receipt.lines.len(), 2);
        assert!(receipt.installments.is_empty());
        assert_eq!(receipt.change_cents, 500);

        // Stock was debited.
        let a_after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 8);

        // The drawer entry carries the sale amount and references.
        let entry = receipt.ledger_entry.unwrap();
        assert_eq!(entry.amount_cents, 2500);
        assert_eq!(entry.kind, TransactionKind::Sale);
        assert_eq!(entry.sale_id.as_deref(), Some(receipt.sale.id.as_str()));
        assert!(entry.description.contains("Ana Lima"));
        assert!(entry.description.contains(receipt.sale.short_ref()));
    }

    #[tokio::test]
    async fn test_insufficient_tendered_writes_nothing() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1500, 10).await;

        let cart = cart_of(&[(&product, 1)]);
        let err = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Cash {
                    tendered_cents: Some(1000),
                },
                "op-1",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InsufficientTendered {
                total_cents: 1500,
                tendered_cents: 1000,
            })
        ));

        // No sale row was created and stock is untouched.
        assert_eq!(db.sales().count().await.unwrap(), 0);
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_empty_cart_and_missing_client_are_rejected() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1000, 10).await;
        let service = CheckoutService::new(db.clone());

        let err = service
            .checkout(&Cart::new(), &client.id, PaymentChoice::Card, "op-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected(CoreError::EmptyCart)));

        let err = service
            .checkout(&Cart::new(), "", PaymentChoice::Card, "op-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::MissingClient)
        ));

        let cart = cart_of(&[(&product, 1)]);
        let err = service
            .checkout(&cart, "ghost", PaymentChoice::Card, "op-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::NotStarted(DbError::NotFound { .. })
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_installment_checkout_builds_the_schedule() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let a = seed_product(&db, "Rice 5kg", 1000, 10).await;
        let b = seed_product(&db, "Coffee 500g", 500, 10).await;
        // A drawer is open, but installments settle later: no ledger entry.
        RegisterLedger::new(db.clone())
            .open("op-1", Money::from_cents(10000))
            .await
            .unwrap();

        let cart = cart_of(&[(&a, 2), (&b, 1)]);
        let receipt = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Installments { count: 3 },
                "op-1",
            )
            .await
            .unwrap();

        assert_eq!(receipt.sale.total_cents, 2500);
        assert_eq!(receipt.sale.payment_tag, "installment_x3");
        assert!(receipt.ledger_entry.is_none());
        assert_eq!(receipt.change_cents, 0);

        let schedule = db.installments().list_for_sale(&receipt.sale.id).await.unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(
            schedule.iter().map(|i| i.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            schedule.iter().map(|i| i.amount_cents).collect::<Vec<_>>(),
            vec![833, 833, 834]
        );
        let sum: i64 = schedule.iter().map(|i| i.amount_cents).sum();
        assert_eq!(sum, receipt.sale.total_cents);

        for installment in &schedule {
            assert_eq!(installment.status, InstallmentStatus::Pending);
            let expected_due = (receipt.sale.created_at
                + Duration::days(30 * installment.number))
            .date_naive();
            assert_eq!(installment.due_date, expected_due);
        }
    }

    #[tokio::test]
    async fn test_invalid_installment_count_is_rejected() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1000, 10).await;

        let cart = cart_of(&[(&product, 1)]);
        let err = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Installments { count: 0 },
                "op-1",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::Validation(_))
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_card_checkout_records_full_total() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1000, 10).await;
        RegisterLedger::new(db.clone())
            .open("op-1", Money::zero())
            .await
            .unwrap();

        let cart = cart_of(&[(&product, 3)]);
        let receipt = CheckoutService::new(db.clone())
            .checkout(&cart, &client.id, PaymentChoice::Card, "op-1")
            .await
            .unwrap();

        let entry = receipt.ledger_entry.unwrap();
        assert_eq!(entry.amount_cents, 3000);
        assert_eq!(receipt.change_cents, 0);
    }

    #[tokio::test]
    async fn test_immediate_payment_without_register_skips_ledger() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1000, 10).await;

        let cart = cart_of(&[(&product, 1)]);
        let receipt = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Cash {
                    tendered_cents: None,
                },
                "op-1",
            )
            .await
            .unwrap();

        assert!(receipt.ledger_entry.is_none());
        // The sale itself still happened.
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    /// The documented gap: a failure mid-sequence leaves earlier steps
    /// committed and names the stage. Here the stock was consumed between
    /// cart and checkout, so the debit step refuses.
    #[tokio::test]
    async fn test_stale_cart_surfaces_partial_at_debit_stage() {
        let db = test_db().await;
        let client = seed_client(&db, "Ana Lima").await;
        let product = seed_product(&db, "Rice 5kg", 1000, 5).await;

        let cart = cart_of(&[(&product, 4)]);

        // Another counter sells 3 units after the cart was built.
        assert!(db.products().debit_stock(&product.id, 3).await.unwrap());

        let err = CheckoutService::new(db.clone())
            .checkout(
                &cart,
                &client.id,
                PaymentChoice::Cash {
                    tendered_cents: Some(4000),
                },
                "op-1",
            )
            .await
            .unwrap_err();

        let CheckoutError::Partial(partial) = err else {
            panic!("expected a partial checkout");
        };
        assert_eq!(partial.stage, CheckoutStage::DebitStock);
        assert!(matches!(
            partial.source,
            PosError::Core(CoreError::InsufficientStock {
                available: 2,
                requested: 4,
                ..
            })
        ));

        // The sale and its lines were committed; the failing debit was not.
        let sale = db.sales().get_by_id(&partial.sale_id).await.unwrap().unwrap();
        assert_eq!(sale.total_cents, 4000);
        assert_eq!(db.sales().get_lines(&partial.sale_id).await.unwrap().len(), 1);
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 2);
    }
}
