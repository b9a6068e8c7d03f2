//! One full recomputation pass against a [`RecordStore`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    services::{
        BudgetService, ForecastReport, ForecastService, PendingConfirmation, RecurrenceService,
        SkippedTemplate,
    },
    store::RecordStore,
};
use crate::{
    config::EngineConfig,
    errors::{EngineError, Result, ScheduleError},
    forecast::TransactionAggregator,
    ledger::MonthKey,
};

/// What a pass did, for the caller to surface.
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeSummary {
    pub as_of: DateTime<Utc>,
    /// Occurrences produced by the scheduler during this pass.
    pub generated: usize,
    /// Occurrences that were new to the store.
    pub inserted: usize,
    pub templates_updated: usize,
    pub awaiting_confirmation: Vec<PendingConfirmation>,
    #[serde(skip)]
    pub overflows: Vec<ScheduleError>,
    pub skipped_templates: Vec<SkippedTemplate>,
    pub categories_updated: usize,
    pub forecast: ForecastReport,
}

impl RecomputeSummary {
    pub fn has_attention_items(&self) -> bool {
        !self.awaiting_confirmation.is_empty()
            || !self.overflows.is_empty()
            || !self.skipped_templates.is_empty()
            || !self.forecast.skipped.is_empty()
            || !self.forecast.at_risk.is_empty()
    }
}

/// Runs recurrence, budget recalculation, and forecasting in order.
#[derive(Debug, Clone)]
pub struct RecomputePass {
    config: EngineConfig,
}

impl RecomputePass {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates due recurring transactions, stores them, recalculates spent
    /// amounts for the month of `as_of`, and forecasts the next period.
    ///
    /// Per-template and per-category problems are reported in the summary.
    /// Only store failures abort the pass.
    pub fn run<S: RecordStore>(
        &self,
        store: &mut S,
        as_of: DateTime<Utc>,
    ) -> Result<RecomputeSummary> {
        let today = as_of.date_naive();

        let templates = store.recurring_templates()?;
        let batch = RecurrenceService::process_all(&templates, as_of, &self.config);
        let inserted = store.insert_transactions(&batch.generated)?;
        let mut templates_updated = 0;
        for template in batch.changed_templates() {
            store.save_template(template)?;
            templates_updated += 1;
        }

        let aggregator = TransactionAggregator::from_config(&self.config);
        let window = aggregator.window_for(today);
        let current = MonthKey::from_date(today);
        let first = window.first().copied().unwrap_or(current).min(current);
        let start = first
            .first_day()
            .ok_or_else(|| EngineError::InvalidInput(format!("no first day for {}", first)))?;
        let end = current
            .last_day()
            .ok_or_else(|| EngineError::InvalidInput(format!("no last day for {}", current)))?;
        let transactions = store.transactions_between(start, end)?;
        let totals = aggregator.aggregate(&transactions, today);

        let mut categories = store.budget_categories()?;
        let categories_updated = BudgetService::apply_totals(&mut categories, &totals, as_of);
        if categories_updated > 0 {
            store.save_budget_categories(&categories)?;
        }

        let forecast = ForecastService::run_with_totals(&categories, &totals, today, &self.config);

        tracing::info!(
            %as_of,
            generated = batch.generated.len(),
            inserted,
            templates_updated,
            categories_updated,
            at_risk = forecast.at_risk.len(),
            "recompute pass complete"
        );

        Ok(RecomputeSummary {
            as_of,
            generated: batch.generated.len(),
            inserted,
            templates_updated,
            awaiting_confirmation: batch.awaiting_confirmation,
            overflows: batch.overflows,
            skipped_templates: batch.skipped,
            categories_updated,
            forecast,
        })
    }
}
