use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryKind;

/// Direction of a transaction relative to the household.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set when the record was materialized from a recurring template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_template: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(
        amount: Decimal,
        date: NaiveDate,
        kind: TransactionKind,
        category: Option<CategoryKind>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            kind,
            category,
            account_id: None,
            description: String::new(),
            notes: None,
            origin_template: None,
            created_at: Utc::now(),
        }
    }

    pub fn expense(amount: Decimal, date: NaiveDate, category: CategoryKind) -> Self {
        Self::new(amount, date, TransactionKind::Expense, Some(category))
    }

    pub fn income(amount: Decimal, date: NaiveDate, category: Option<CategoryKind>) -> Self {
        Self::new(amount, date, TransactionKind::Income, category)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_generated(&self) -> bool {
        self.origin_template.is_some()
    }
}
