//! Groups transactions into per-category calendar-month totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::EngineConfig,
    ledger::{CategoryKind, MonthKey, TransactionKind, TransactionRecord},
};

/// Income and expense totals across all categories for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlySummary {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Output of one aggregation pass. Pure data; recomputed on demand.
#[derive(Debug, Clone, Default)]
pub struct MonthlyTotals {
    pub as_of: Option<NaiveDate>,
    /// History months, oldest first.
    pub window: Vec<MonthKey>,
    pub expense_by_month: BTreeMap<(CategoryKind, MonthKey), Decimal>,
    pub income_by_month: BTreeMap<(CategoryKind, MonthKey), Decimal>,
    pub uncategorized_expense: BTreeMap<MonthKey, Decimal>,
    pub expense_history: BTreeMap<CategoryKind, Vec<Decimal>>,
    pub income_history: BTreeMap<CategoryKind, Vec<Decimal>>,
    pub months: BTreeMap<MonthKey, MonthlySummary>,
}

impl MonthlyTotals {
    pub fn expense_total(&self, category: CategoryKind, month: MonthKey) -> Decimal {
        self.expense_by_month
            .get(&(category, month))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn income_total(&self, category: CategoryKind, month: MonthKey) -> Decimal {
        self.income_by_month
            .get(&(category, month))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Expense history for `category` aligned with `window`; all zeros when
    /// the category has no activity.
    pub fn expense_history_for(&self, category: CategoryKind) -> Vec<Decimal> {
        self.expense_history
            .get(&category)
            .cloned()
            .unwrap_or_else(|| vec![Decimal::ZERO; self.window.len()])
    }

    /// Expense total for the month containing the reference date.
    pub fn current_period_expense(&self, category: CategoryKind) -> Decimal {
        match self.as_of {
            Some(as_of) => self.expense_total(category, MonthKey::from_date(as_of)),
            None => Decimal::ZERO,
        }
    }

    pub fn summary_for(&self, month: MonthKey) -> MonthlySummary {
        self.months.get(&month).copied().unwrap_or_default()
    }
}

/// Builds [`MonthlyTotals`] for a configurable history window.
#[derive(Debug, Clone, Copy)]
pub struct TransactionAggregator {
    pub history_window: usize,
    pub include_current_month: bool,
}

impl TransactionAggregator {
    pub fn new(history_window: usize) -> Self {
        Self {
            history_window,
            include_current_month: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            history_window: config.history_window,
            include_current_month: config.include_current_month,
        }
    }

    /// History months for `as_of`. The window closes with the last complete
    /// month unless the current month is included.
    pub fn window_for(&self, as_of: NaiveDate) -> Vec<MonthKey> {
        let current = MonthKey::from_date(as_of);
        let end = if self.include_current_month {
            current
        } else {
            current.previous()
        };
        MonthKey::trailing(end, self.history_window)
    }

    pub fn aggregate(&self, transactions: &[TransactionRecord], as_of: NaiveDate) -> MonthlyTotals {
        let mut totals = MonthlyTotals {
            as_of: Some(as_of),
            window: self.window_for(as_of),
            ..MonthlyTotals::default()
        };

        for txn in transactions {
            let month = MonthKey::from_date(txn.date);
            let summary = totals.months.entry(month).or_default();
            match txn.kind {
                TransactionKind::Expense => summary.expense += txn.amount,
                TransactionKind::Income => summary.income += txn.amount,
            }

            match (txn.kind, txn.category) {
                (TransactionKind::Expense, Some(category)) => {
                    *totals
                        .expense_by_month
                        .entry((category, month))
                        .or_insert(Decimal::ZERO) += txn.amount;
                }
                (TransactionKind::Income, Some(category)) => {
                    *totals
                        .income_by_month
                        .entry((category, month))
                        .or_insert(Decimal::ZERO) += txn.amount;
                }
                (TransactionKind::Expense, None) => {
                    *totals
                        .uncategorized_expense
                        .entry(month)
                        .or_insert(Decimal::ZERO) += txn.amount;
                }
                (TransactionKind::Income, None) => {}
            }
        }

        totals.expense_history = histories(&totals.expense_by_month, &totals.window);
        totals.income_history = histories(&totals.income_by_month, &totals.window);
        totals
    }
}

/// Aggregates with the default policy: the window ends at the month before `as_of`.
pub fn aggregate(
    transactions: &[TransactionRecord],
    as_of: NaiveDate,
    history_window: usize,
) -> MonthlyTotals {
    TransactionAggregator::new(history_window).aggregate(transactions, as_of)
}

fn histories(
    by_month: &BTreeMap<(CategoryKind, MonthKey), Decimal>,
    window: &[MonthKey],
) -> BTreeMap<CategoryKind, Vec<Decimal>> {
    let mut result: BTreeMap<CategoryKind, Vec<Decimal>> = BTreeMap::new();
    for (category, _) in by_month.keys() {
        result.entry(*category).or_insert_with(|| {
            window
                .iter()
                .map(|month| {
                    by_month
                        .get(&(*category, *month))
                        .copied()
                        .unwrap_or(Decimal::ZERO)
                })
                .collect()
        });
    }
    result
}
