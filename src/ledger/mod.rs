//! Ledger records, calendar helpers, and the recurring template scheduler.

pub mod category;
pub mod period;
pub mod recurring;
pub mod template;
pub mod time_interval;
pub mod transaction;

pub use category::{BudgetCategoryRecord, BudgetPeriod, CategoryKind};
pub use period::MonthKey;
pub use recurring::{
    catch_up_cap, occurrence_id, overdue_periods, process_overdue, process_overdue_with_cap,
    skip_ahead, snapshot_templates, upcoming, OverdueRun, RecurrenceSnapshot, ScheduledStatus,
};
pub use template::{RecurringTemplate, TemplateState};
pub use time_interval::{advance_due_date, Frequency};
pub use transaction::{TransactionKind, TransactionRecord};
