use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    template::{RecurringTemplate, TemplateState},
    time_interval::Frequency,
    transaction::TransactionRecord,
};
use crate::{config::EngineConfig, errors::ScheduleError};

/// Where a scheduled date sits relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduledStatus {
    Overdue,
    Pending,
    Future,
}

impl ScheduledStatus {
    pub fn classify(scheduled: NaiveDate, reference: NaiveDate, pending_days: i64) -> Self {
        if scheduled < reference {
            return ScheduledStatus::Overdue;
        }
        // A cutoff past the calendar's end covers every date.
        let cutoff = Duration::try_days(pending_days)
            .and_then(|window| reference.checked_add_signed(window));
        match cutoff {
            Some(cutoff) if scheduled > cutoff => ScheduledStatus::Future,
            _ => ScheduledStatus::Pending,
        }
    }
}

/// Result of one catch-up run: the advanced template and what it produced.
#[derive(Debug, Clone)]
pub struct OverdueRun {
    pub template: RecurringTemplate,
    pub generated: Vec<TransactionRecord>,
}

impl OverdueRun {
    pub fn ended(&self) -> bool {
        self.template.state == TemplateState::Ended
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurrenceSnapshot {
    pub template_id: Uuid,
    pub name: String,
    pub interval_label: &'static str,
    pub next_due: Option<NaiveDate>,
    pub status: Option<ScheduledStatus>,
    pub overdue: usize,
    pub state: TemplateState,
    pub auto_pay: bool,
}

/// Maximum number of periods one run may generate for `frequency`.
pub fn catch_up_cap(frequency: Frequency, config: &EngineConfig) -> usize {
    frequency.periods_per_year() * config.max_catch_up_years as usize
}

/// Generates every occurrence due on or before `as_of`, advancing the due date
/// past each one.
///
/// Runs against a copy: on error the caller's template is untouched. A second
/// call with the same `as_of` generates nothing.
pub fn process_overdue(
    template: &RecurringTemplate,
    as_of: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<OverdueRun, ScheduleError> {
    process_overdue_with_cap(template, as_of, catch_up_cap(template.frequency, config))
}

/// Same as [`process_overdue`] with an explicit iteration cap, for callers
/// that chose to bulk-generate a long backlog.
pub fn process_overdue_with_cap(
    template: &RecurringTemplate,
    as_of: DateTime<Utc>,
    cap: usize,
) -> Result<OverdueRun, ScheduleError> {
    let today = as_of.date_naive();
    let mut next = template.clone();
    let mut generated = Vec::new();

    while next.state == TemplateState::Active && next.next_due_date <= today {
        if let Some(end) = next.end_date {
            if next.next_due_date > end {
                next.state = TemplateState::Ended;
                break;
            }
        }
        if generated.len() >= cap {
            return Err(ScheduleError::Overflow {
                template_id: template.id,
                pending_since: template.next_due_date,
                cap,
            });
        }

        let due = next.next_due_date;
        let record = materialize_occurrence(&next, due, as_of);
        tracing::debug!(template = %next.id, date = %due, "generated recurring occurrence");
        next.generated.push(record.id);
        generated.push(record);

        next.next_due_date = next
            .frequency
            .next_date(due)
            .ok_or(ScheduleError::DateOutOfRange {
                template_id: template.id,
                date: due,
            })?;
        if next.end_date.is_some_and(|end| next.next_due_date > end) {
            next.state = TemplateState::Ended;
        }
    }

    if !generated.is_empty() || next.state != template.state {
        next.updated_at = as_of;
    }
    Ok(OverdueRun {
        template: next,
        generated,
    })
}

/// Moves the due date past `as_of` without generating anything. Returns the
/// number of periods skipped.
pub fn skip_ahead(
    template: &mut RecurringTemplate,
    as_of: DateTime<Utc>,
) -> Result<usize, ScheduleError> {
    let today = as_of.date_naive();
    let mut skipped = 0usize;
    while template.state == TemplateState::Active && template.next_due_date <= today {
        if template.end_date.is_some_and(|end| template.next_due_date > end) {
            template.state = TemplateState::Ended;
            break;
        }
        let due = template.next_due_date;
        template.next_due_date = template
            .frequency
            .next_date(due)
            .ok_or(ScheduleError::DateOutOfRange {
                template_id: template.id,
                date: due,
            })?;
        skipped += 1;
        if template.end_date.is_some_and(|end| template.next_due_date > end) {
            template.state = TemplateState::Ended;
        }
    }
    if skipped > 0 {
        template.updated_at = as_of;
        tracing::info!(template = %template.id, skipped, "skipped overdue periods");
    }
    Ok(skipped)
}

/// Upcoming occurrence dates from the current due date through `until`,
/// limited to `limit` entries. Inactive templates have no schedule.
pub fn upcoming(template: &RecurringTemplate, until: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if template.state != TemplateState::Active {
        return dates;
    }
    let mut cursor = Some(template.next_due_date);
    while let Some(date) = cursor {
        if date > until || dates.len() >= limit {
            break;
        }
        if template.end_date.is_some_and(|end| date > end) {
            break;
        }
        dates.push(date);
        cursor = template.frequency.next_date(date);
    }
    dates
}

/// Counts due-but-ungenerated periods as of `as_of`, stopping at `limit`.
pub fn overdue_periods(template: &RecurringTemplate, as_of: DateTime<Utc>, limit: usize) -> usize {
    upcoming(template, as_of.date_naive(), limit).len()
}

/// Summaries for a set of templates ordered by next due date.
pub fn snapshot_templates(
    templates: &[RecurringTemplate],
    as_of: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<RecurrenceSnapshot> {
    let today = as_of.date_naive();
    let mut snapshots: Vec<RecurrenceSnapshot> = templates
        .iter()
        .map(|template| {
            let next_due = match template.state {
                TemplateState::Ended => None,
                _ => Some(template.next_due_date),
            };
            let status = next_due
                .map(|date| ScheduledStatus::classify(date, today, config.pending_window_days));
            RecurrenceSnapshot {
                template_id: template.id,
                name: template.name.clone(),
                interval_label: template.frequency.label(),
                next_due,
                status,
                overdue: overdue_periods(template, as_of, catch_up_cap(template.frequency, config)),
                state: template.state,
                auto_pay: template.auto_pay,
            }
        })
        .collect();
    snapshots.sort_by_key(|snap| (snap.next_due.is_none(), snap.next_due, snap.template_id));
    snapshots
}

/// Stable id for the occurrence of `template` on `date`, so a repeated run
/// produces the same record ids.
pub fn occurrence_id(template_id: Uuid, date: NaiveDate) -> Uuid {
    Uuid::new_v5(&template_id, date.to_string().as_bytes())
}

fn materialize_occurrence(
    template: &RecurringTemplate,
    date: NaiveDate,
    created_at: DateTime<Utc>,
) -> TransactionRecord {
    TransactionRecord {
        id: occurrence_id(template.id, date),
        amount: template.amount,
        date,
        kind: template.kind,
        category: template.category,
        account_id: template.account_id,
        description: template.name.clone(),
        notes: template.notes.clone(),
        origin_template: Some(template.id),
        created_at,
    }
}
