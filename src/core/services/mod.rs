pub mod budget_service;
pub mod forecast_service;
pub mod recurrence_service;

pub use budget_service::{recalculate_budgets, BudgetService};
pub use forecast_service::{ForecastReport, ForecastService, SkippedCategory};
pub use recurrence_service::{
    OverflowResolution, PendingConfirmation, RecurrenceBatch, RecurrenceService, SkippedTemplate,
};
