//! Statistical forecasting over monthly spend history.
//!
//! Transactions are folded into calendar-month totals by the
//! [`TransactionAggregator`], classified by the [`TrendAnalyzer`], projected
//! one period forward by the [`ForecastEngine`], and checked against the
//! category budget by the [`RiskClassifier`].

pub mod aggregator;
pub mod engine;
pub mod risk;
pub mod trend;

use rust_decimal::Decimal;
use serde::Serialize;

pub use aggregator::{aggregate, MonthlySummary, MonthlyTotals, TransactionAggregator};
pub use engine::{Confidence, ForecastEngine, Prediction};
pub use risk::{at_risk_categories, RiskAssessment, RiskBand, RiskClassifier};
pub use trend::{Trend, TrendAnalyzer, TrendReading};

use crate::ledger::CategoryKind;

/// Input to a single category forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryHistory {
    pub category: CategoryKind,
    /// Monthly expense totals, oldest first.
    pub monthly_totals: Vec<Decimal>,
    pub budget_amount: Decimal,
}

impl CategoryHistory {
    pub fn new(category: CategoryKind, monthly_totals: Vec<Decimal>, budget_amount: Decimal) -> Self {
        Self {
            category,
            monthly_totals,
            budget_amount,
        }
    }

    /// Pulls the expense history for `category` out of an aggregation pass.
    pub fn from_totals(totals: &MonthlyTotals, category: CategoryKind, budget_amount: Decimal) -> Self {
        Self::new(category, totals.expense_history_for(category), budget_amount)
    }
}

/// Derived per-category projection. Recomputed on every run and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryForecast {
    pub category: CategoryKind,
    pub average_spend: Decimal,
    pub predicted_spend: Decimal,
    pub budget_amount: Decimal,
    pub trend: Trend,
    pub confidence: Confidence,
    /// Percentage of budget; zero when the category has no budget.
    pub predicted_utilisation: Decimal,
    pub overspend_amount: Decimal,
    pub risk: RiskBand,
    /// Months in the window with non-zero spend.
    pub months_of_history: usize,
}

impl CategoryForecast {
    pub fn is_at_risk(&self) -> bool {
        self.risk == RiskBand::AtRisk
    }
}

/// Forecasts one category with the default engine settings.
pub fn forecast(history: &CategoryHistory) -> CategoryForecast {
    ForecastEngine::default().forecast(history)
}
