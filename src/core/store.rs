//! Persistence boundary consumed by a recomputation pass.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::Result,
    ledger::{BudgetCategoryRecord, RecurringTemplate, TransactionRecord},
};

/// Read/write access to the records the engine works over.
///
/// Reads are expected to return a consistent snapshot for the duration of one
/// pass. Implementations decide how records are stored.
pub trait RecordStore {
    /// Transactions dated within `start..=end`.
    fn transactions_between(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<TransactionRecord>>;
    fn budget_categories(&self) -> Result<Vec<BudgetCategoryRecord>>;
    fn recurring_templates(&self) -> Result<Vec<RecurringTemplate>>;
    /// Inserts records whose ids are not yet stored. Returns how many were new.
    fn insert_transactions(&mut self, records: &[TransactionRecord]) -> Result<usize>;
    fn save_budget_categories(&mut self, categories: &[BudgetCategoryRecord]) -> Result<()>;
    fn save_template(&mut self, template: &RecurringTemplate) -> Result<()>;
}

/// Serializable in-memory record set. Doubles as the on-disk JSON format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub categories: Vec<BudgetCategoryRecord>,
    #[serde(default)]
    pub templates: Vec<RecurringTemplate>,
    pub updated_at: DateTime<Utc>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            categories: Vec::new(),
            templates: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl LedgerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(mut self, transactions: Vec<TransactionRecord>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_categories(mut self, categories: Vec<BudgetCategoryRecord>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_templates(mut self, templates: Vec<RecurringTemplate>) -> Self {
        self.templates = templates;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Transactions generated from the given template, in date order.
    pub fn generated_by(&self, template_id: Uuid) -> Vec<&TransactionRecord> {
        let mut records: Vec<&TransactionRecord> = self
            .transactions
            .iter()
            .filter(|txn| txn.origin_template == Some(template_id))
            .collect();
        records.sort_by_key(|txn| txn.date);
        records
    }
}

impl RecordStore for LedgerSnapshot {
    fn transactions_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .transactions
            .iter()
            .filter(|txn| txn.date >= start && txn.date <= end)
            .cloned()
            .collect())
    }

    fn budget_categories(&self) -> Result<Vec<BudgetCategoryRecord>> {
        Ok(self.categories.clone())
    }

    fn recurring_templates(&self) -> Result<Vec<RecurringTemplate>> {
        Ok(self.templates.clone())
    }

    fn insert_transactions(&mut self, records: &[TransactionRecord]) -> Result<usize> {
        let mut known: HashSet<Uuid> = self.transactions.iter().map(|txn| txn.id).collect();
        let mut inserted = 0;
        for record in records {
            if known.insert(record.id) {
                self.transactions.push(record.clone());
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.touch();
        }
        Ok(inserted)
    }

    fn save_budget_categories(&mut self, categories: &[BudgetCategoryRecord]) -> Result<()> {
        for category in categories {
            match self.categories.iter_mut().find(|existing| existing.id == category.id) {
                Some(existing) => *existing = category.clone(),
                None => self.categories.push(category.clone()),
            }
        }
        self.touch();
        Ok(())
    }

    fn save_template(&mut self, template: &RecurringTemplate) -> Result<()> {
        match self.templates.iter_mut().find(|existing| existing.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => self.templates.push(template.clone()),
        }
        self.touch();
        Ok(())
    }
}
