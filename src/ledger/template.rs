use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::CategoryKind, time_interval::Frequency, transaction::TransactionKind};
use crate::errors::{EngineError, ScheduleError};

/// Lifecycle of a recurring template.
///
/// `Active` and `Paused` toggle on user request; `Ended` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateState {
    #[default]
    Active,
    Paused,
    Ended,
}

/// A recurring transaction definition (rent, salary, subscriptions, ...).
///
/// `next_due_date`, `state`, and `generated` are owned by the scheduler and
/// only change through its operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub(crate) next_due_date: NaiveDate,
    #[serde(default)]
    pub(crate) state: TemplateState,
    #[serde(default)]
    pub auto_pay: bool,
    #[serde(default)]
    pub(crate) generated: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringTemplate {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "recurring template needs a name".into(),
            ));
        }
        if amount < Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "recurring template `{}` cannot have a negative amount ({})",
                name, amount
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            amount,
            kind,
            category: None,
            account_id: None,
            frequency,
            start_date,
            end_date: None,
            next_due_date: start_date,
            state: TemplateState::Active,
            auto_pay: false,
            generated: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_category(mut self, category: CategoryKind) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_auto_pay(mut self, auto_pay: bool) -> Self {
        self.auto_pay = auto_pay;
        self
    }

    /// Sets the last date on which an occurrence may be generated.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Result<Self, EngineError> {
        if end_date < self.start_date {
            return Err(EngineError::InvalidInput(format!(
                "end date {} precedes start date {} for `{}`",
                end_date, self.start_date, self.name
            )));
        }
        self.end_date = Some(end_date);
        Ok(self)
    }

    pub fn next_due_date(&self) -> NaiveDate {
        self.next_due_date
    }

    pub fn state(&self) -> TemplateState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TemplateState::Active
    }

    /// Ids of transactions generated from this template, oldest first.
    pub fn generated(&self) -> &[Uuid] {
        &self.generated
    }

    /// Checks the invariants a persisted template must satisfy.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.amount < Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "template {} has a negative amount",
                self.id
            )));
        }
        if self.next_due_date < self.start_date {
            return Err(EngineError::InvalidInput(format!(
                "template {} is due before its start date",
                self.id
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(EngineError::InvalidInput(format!(
                    "template {} ends before it starts",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Stops generation without touching the due date.
    pub fn pause(&mut self, at: DateTime<Utc>) -> Result<(), ScheduleError> {
        match self.state {
            TemplateState::Paused => Ok(()),
            TemplateState::Active => {
                self.state = TemplateState::Paused;
                self.updated_at = at;
                Ok(())
            }
            TemplateState::Ended => Err(ScheduleError::InvalidTransition {
                from: TemplateState::Ended,
                to: TemplateState::Paused,
            }),
        }
    }

    /// Reactivates a paused template. Missed periods are not back-generated
    /// until an explicit catch-up run.
    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<(), ScheduleError> {
        match self.state {
            TemplateState::Active => Ok(()),
            TemplateState::Paused => {
                self.state = TemplateState::Active;
                self.updated_at = at;
                Ok(())
            }
            TemplateState::Ended => Err(ScheduleError::InvalidTransition {
                from: TemplateState::Ended,
                to: TemplateState::Active,
            }),
        }
    }

    /// Terminates the template. Irreversible.
    pub fn end(&mut self, at: DateTime<Utc>) {
        if self.state != TemplateState::Ended {
            self.state = TemplateState::Ended;
            self.updated_at = at;
        }
    }
}
