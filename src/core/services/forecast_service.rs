//! Forecast runs across every budgeted or active category.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::EngineConfig,
    errors::Result,
    forecast::{
        at_risk_categories, CategoryForecast, CategoryHistory, ForecastEngine, MonthlyTotals,
        TransactionAggregator,
    },
    ledger::{BudgetCategoryRecord, CategoryKind, MonthKey, TransactionRecord},
};

/// A category left out of a forecast run and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCategory {
    pub category: CategoryKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub as_of: NaiveDate,
    /// Months the forecasts were derived from, oldest first.
    pub window: Vec<MonthKey>,
    /// One forecast per category, in category order.
    pub forecasts: Vec<CategoryForecast>,
    /// Over-budget forecasts, largest overspend first.
    pub at_risk: Vec<CategoryForecast>,
    pub total_predicted: Decimal,
    pub total_budgeted: Decimal,
    pub skipped: Vec<SkippedCategory>,
}

impl ForecastReport {
    pub fn forecast_for(&self, category: CategoryKind) -> Option<&CategoryForecast> {
        self.forecasts
            .iter()
            .find(|forecast| forecast.category == category)
    }
}

pub struct ForecastService;

impl ForecastService {
    /// Aggregates `transactions` and forecasts each category.
    ///
    /// Active budgets are forecast against their amount. Categories with spend
    /// in the window but no active budget are forecast with a zero budget.
    /// Malformed budgets are skipped and reported.
    pub fn run(
        categories: &[BudgetCategoryRecord],
        transactions: &[TransactionRecord],
        as_of: NaiveDate,
        config: &EngineConfig,
    ) -> Result<ForecastReport> {
        config.validate()?;
        let totals = TransactionAggregator::from_config(config).aggregate(transactions, as_of);
        Ok(Self::run_with_totals(categories, &totals, as_of, config))
    }

    /// Forecasts from an aggregation pass computed by the caller.
    pub fn run_with_totals(
        categories: &[BudgetCategoryRecord],
        totals: &MonthlyTotals,
        as_of: NaiveDate,
        config: &EngineConfig,
    ) -> ForecastReport {
        let engine = ForecastEngine::from_config(config);
        let mut budgets: BTreeMap<CategoryKind, Decimal> = BTreeMap::new();
        let mut skipped = Vec::new();

        for category in categories.iter().filter(|category| category.is_active) {
            if !category.is_valid() {
                tracing::warn!(category = %category.kind, "skipping category with negative budget");
                skipped.push(SkippedCategory {
                    category: category.kind,
                    reason: format!("negative budget {}", category.budgeted_amount),
                });
                continue;
            }
            if budgets.contains_key(&category.kind) {
                tracing::warn!(category = %category.kind, "skipping duplicate budget");
                skipped.push(SkippedCategory {
                    category: category.kind,
                    reason: "duplicate budget for category".to_string(),
                });
                continue;
            }
            budgets.insert(category.kind, category.budgeted_amount);
        }

        let skipped_kinds: Vec<CategoryKind> = skipped.iter().map(|entry| entry.category).collect();
        for (kind, history) in &totals.expense_history {
            let has_spend = history.iter().any(|value| !value.is_zero());
            if has_spend && !skipped_kinds.contains(kind) {
                budgets.entry(*kind).or_insert(Decimal::ZERO);
            }
        }

        let forecasts: Vec<CategoryForecast> = budgets
            .iter()
            .map(|(kind, budget)| {
                engine.forecast(&CategoryHistory::from_totals(totals, *kind, *budget))
            })
            .collect();
        let at_risk = at_risk_categories(&forecasts);
        let total_predicted: Decimal = forecasts.iter().map(|forecast| forecast.predicted_spend).sum();
        let total_budgeted: Decimal = budgets.values().copied().sum();

        tracing::info!(
            %as_of,
            categories = forecasts.len(),
            at_risk = at_risk.len(),
            skipped = skipped.len(),
            "forecast run complete"
        );

        ForecastReport {
            as_of,
            window: totals.window.clone(),
            forecasts,
            at_risk,
            total_predicted,
            total_budgeted,
            skipped,
        }
    }
}
