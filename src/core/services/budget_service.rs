//! Keeps each budget category's spent amount in sync with the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    forecast::{MonthlyTotals, TransactionAggregator},
    ledger::{BudgetCategoryRecord, MonthKey, TransactionRecord},
};

/// Stateless recalculation over category and transaction snapshots.
///
/// This is the only code path that writes `spent_amount`.
pub struct BudgetService;

impl BudgetService {
    /// Returns copies of `categories` with `spent_amount` set to the expense
    /// total of the month containing `as_of`. Inactive categories come back
    /// unchanged.
    pub fn recalculate(
        categories: &[BudgetCategoryRecord],
        transactions: &[TransactionRecord],
        as_of: DateTime<Utc>,
    ) -> Vec<BudgetCategoryRecord> {
        let totals = TransactionAggregator::new(1).aggregate(transactions, as_of.date_naive());
        let mut updated = categories.to_vec();
        Self::apply_totals(&mut updated, &totals, as_of);
        updated
    }

    /// Writes current-period spend from an existing aggregation pass. Returns
    /// the number of categories whose spent amount changed.
    pub fn apply_totals(
        categories: &mut [BudgetCategoryRecord],
        totals: &MonthlyTotals,
        at: DateTime<Utc>,
    ) -> usize {
        let mut changed = 0;
        for category in categories.iter_mut().filter(|category| category.is_active) {
            let spent = totals.current_period_expense(category.kind);
            if category.spent_amount != spent {
                category.spent_amount = spent;
                category.updated_at = at;
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::debug!(
                changed,
                period = ?totals.as_of.map(MonthKey::from_date),
                "budget categories recalculated"
            );
        }
        changed
    }

    /// Sum of budgeted amounts across active categories.
    pub fn total_budgeted(categories: &[BudgetCategoryRecord]) -> Decimal {
        categories
            .iter()
            .filter(|category| category.is_active)
            .map(|category| category.budgeted_amount)
            .sum()
    }

    /// Sum of spent amounts across active categories.
    pub fn total_spent(categories: &[BudgetCategoryRecord]) -> Decimal {
        categories
            .iter()
            .filter(|category| category.is_active)
            .map(|category| category.spent_amount)
            .sum()
    }
}

/// Free-function form of [`BudgetService::recalculate`].
pub fn recalculate_budgets(
    categories: &[BudgetCategoryRecord],
    transactions: &[TransactionRecord],
    as_of: DateTime<Utc>,
) -> Vec<BudgetCategoryRecord> {
    BudgetService::recalculate(categories, transactions, as_of)
}
