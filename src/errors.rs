use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::TemplateState;

/// Error type that captures engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Failures raised while advancing or transitioning a recurring template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(
        "template {template_id} has more than {cap} overdue periods pending since {pending_since}"
    )]
    Overflow {
        template_id: Uuid,
        pending_since: NaiveDate,
        cap: usize,
    },
    #[error("template cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: TemplateState, to: TemplateState },
    #[error("template {template_id} cannot be advanced past {date}")]
    DateOutOfRange { template_id: Uuid, date: NaiveDate },
}

pub type Result<T> = std::result::Result<T, EngineError>;
