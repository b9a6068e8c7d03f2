//! Batch maintenance of recurring templates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    errors::{EngineError, Result, ScheduleError},
    ledger::{
        overdue_periods, process_overdue, process_overdue_with_cap, skip_ahead, OverdueRun,
        RecurringTemplate, TemplateState, TransactionRecord,
    },
};

/// A manual template with periods waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingConfirmation {
    pub template_id: Uuid,
    pub name: String,
    pub due: NaiveDate,
    pub periods: usize,
}

/// A template left out of a batch run and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTemplate {
    pub template_id: Uuid,
    pub reason: String,
}

/// How the caller chose to settle a schedule overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowResolution {
    /// Generate every missed occurrence regardless of the usual cap.
    BulkGenerate,
    /// Move past the missed periods without generating anything.
    SkipAhead,
}

/// Outcome of [`RecurrenceService::process_all`].
#[derive(Debug, Clone, Default)]
pub struct RecurrenceBatch {
    /// Every input template, advanced where generation happened, in input order.
    pub templates: Vec<RecurringTemplate>,
    pub generated: Vec<TransactionRecord>,
    pub awaiting_confirmation: Vec<PendingConfirmation>,
    pub overflows: Vec<ScheduleError>,
    pub skipped: Vec<SkippedTemplate>,
    /// Ids of templates whose state or due date changed.
    pub changed: Vec<Uuid>,
}

impl RecurrenceBatch {
    pub fn changed_templates(&self) -> impl Iterator<Item = &RecurringTemplate> {
        self.templates
            .iter()
            .filter(|template| self.changed.contains(&template.id))
    }
}

/// Stateless helpers over recurring template snapshots.
pub struct RecurrenceService;

impl RecurrenceService {
    /// Runs catch-up generation for every auto-pay template. Manual templates
    /// that are due are reported instead of materialized. A failing template
    /// is recorded and the rest of the batch continues.
    pub fn process_all(
        templates: &[RecurringTemplate],
        as_of: DateTime<Utc>,
        config: &EngineConfig,
    ) -> RecurrenceBatch {
        let mut batch = RecurrenceBatch::default();

        for template in templates {
            if let Err(err) = template.validate() {
                tracing::warn!(template = %template.id, error = %err, "skipping invalid template");
                batch.skipped.push(SkippedTemplate {
                    template_id: template.id,
                    reason: err.to_string(),
                });
                batch.templates.push(template.clone());
                continue;
            }

            if !template.auto_pay {
                let periods = overdue_periods(template, as_of, usize::MAX);
                if periods > 0 {
                    batch.awaiting_confirmation.push(PendingConfirmation {
                        template_id: template.id,
                        name: template.name.clone(),
                        due: template.next_due_date(),
                        periods,
                    });
                }
                batch.templates.push(template.clone());
                continue;
            }

            match process_overdue(template, as_of, config) {
                Ok(run) => {
                    if run.template != *template {
                        batch.changed.push(template.id);
                    }
                    batch.generated.extend(run.generated);
                    batch.templates.push(run.template);
                }
                Err(err @ ScheduleError::Overflow { .. }) => {
                    tracing::warn!(template = %template.id, error = %err, "schedule overflow");
                    batch.overflows.push(err);
                    batch.templates.push(template.clone());
                }
                Err(err) => {
                    tracing::warn!(template = %template.id, error = %err, "skipping template");
                    batch.skipped.push(SkippedTemplate {
                        template_id: template.id,
                        reason: err.to_string(),
                    });
                    batch.templates.push(template.clone());
                }
            }
        }

        tracing::info!(
            templates = templates.len(),
            generated = batch.generated.len(),
            awaiting = batch.awaiting_confirmation.len(),
            overflows = batch.overflows.len(),
            "recurrence batch complete"
        );
        batch
    }

    /// Materializes the due periods of a manual template once the user confirms.
    pub fn confirm(
        template: &RecurringTemplate,
        as_of: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Result<OverdueRun> {
        Ok(process_overdue(template, as_of, config)?)
    }

    /// Settles a template whose backlog exceeded the catch-up cap.
    pub fn resolve_overflow(
        template: &RecurringTemplate,
        as_of: DateTime<Utc>,
        resolution: OverflowResolution,
    ) -> Result<OverdueRun> {
        match resolution {
            OverflowResolution::BulkGenerate => {
                let backlog = overdue_periods(template, as_of, usize::MAX);
                Ok(process_overdue_with_cap(template, as_of, backlog)?)
            }
            OverflowResolution::SkipAhead => {
                let mut next = template.clone();
                skip_ahead(&mut next, as_of)?;
                Ok(OverdueRun {
                    template: next,
                    generated: Vec::new(),
                })
            }
        }
    }

    /// Applies a user-requested lifecycle change to the template with `id`.
    pub fn set_state(
        templates: &mut [RecurringTemplate],
        id: Uuid,
        state: TemplateState,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let template = templates
            .iter_mut()
            .find(|template| template.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("recurring template {}", id)))?;
        match state {
            TemplateState::Active => template.resume(at)?,
            TemplateState::Paused => template.pause(at)?,
            TemplateState::Ended => template.end(at),
        }
        Ok(())
    }
}
