//! # Installment Schedule
//!
//! Pure construction of an installment plan from a sale total, a count, and
//! the checkout timestamp. The service layer persists the plan; this module
//! only computes it.
//!
//! ## Schedule Shape
//! ```text
//! plan_installments($25.00, 3, checkout at 2026-01-15)
//!
//!   #1  due 2026-02-14  $8.33     (+30 days)
//!   #2  due 2026-03-16  $8.33     (+60 days)
//!   #3  due 2026-04-15  $8.34     (+90 days, carries the remainder cent)
//!                       ──────
//!                       $25.00    shares always sum back to the total
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::{INSTALLMENT_INTERVAL_DAYS, MAX_INSTALLMENT_COUNT};

/// One entry of a computed (not yet persisted) installment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedInstallment {
    /// Ordinal within the schedule, 1..N.
    pub number: i64,
    pub due_date: NaiveDate,
    pub amount_cents: i64,
}

impl PlannedInstallment {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Builds the installment plan for a sale.
///
/// - Amounts are an equal split of the total with the remainder cents on the
///   final installment, so the plan sums exactly to the total.
/// - Due dates fall `30 × k` days after `checkout_at` for k = 1..N,
///   truncated to a calendar date.
///
/// ## Errors
/// `CoreError::InvalidInstallmentCount` when `count` is 0 or above
/// [`MAX_INSTALLMENT_COUNT`].
pub fn plan_installments(
    total: Money,
    count: u32,
    checkout_at: DateTime<Utc>,
) -> Result<Vec<PlannedInstallment>, CoreError> {
    if count == 0 || count > MAX_INSTALLMENT_COUNT {
        return Err(CoreError::InvalidInstallmentCount {
            requested: count,
            max: MAX_INSTALLMENT_COUNT,
        });
    }

    let shares = total.split_equal(count);

    let plan = shares
        .into_iter()
        .enumerate()
        .map(|(index, share)| {
            let k = index as i64 + 1;
            PlannedInstallment {
                number: k,
                due_date: (checkout_at + Duration::days(INSTALLMENT_INTERVAL_DAYS * k))
                    .date_naive(),
                amount_cents: share.cents(),
            }
        })
        .collect();

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn checkout_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_plan_ordinals_and_due_dates() {
        let plan = plan_installments(Money::from_cents(2500), 3, checkout_at()).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.iter().map(|p| p.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            plan.iter().map(|p| p.due_date).collect::<Vec<_>>(),
            vec![
                NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
            ]
        );
    }

    /// $25.00 over 3 installments: 833 + 833 + 834 cents, summing exactly.
    #[test]
    fn test_plan_amounts_sum_to_total() {
        let plan = plan_installments(Money::from_cents(2500), 3, checkout_at()).unwrap();

        assert_eq!(
            plan.iter().map(|p| p.amount_cents).collect::<Vec<_>>(),
            vec![833, 833, 834]
        );
        let sum: i64 = plan.iter().map(|p| p.amount_cents).sum();
        assert_eq!(sum, 2500);
    }

    #[test]
    fn test_plan_single_installment() {
        let plan = plan_installments(Money::from_cents(2500), 1, checkout_at()).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].amount_cents, 2500);
        assert_eq!(
            plan[0].due_date,
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
    }

    #[test]
    fn test_plan_rejects_zero_count() {
        let err = plan_installments(Money::from_cents(2500), 0, checkout_at()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidInstallmentCount { requested: 0, .. }
        ));
    }

    #[test]
    fn test_plan_rejects_count_above_max() {
        let err = plan_installments(
            Money::from_cents(2500),
            MAX_INSTALLMENT_COUNT + 1,
            checkout_at(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInstallmentCount { .. }));
    }
}
