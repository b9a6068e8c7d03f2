use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

/// Closed set of buckets used for budgeting and forecasting.
///
/// Declaration order is the stable ordering used to break ties in reports.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Housing,
    Utilities,
    Groceries,
    Dining,
    Transport,
    Healthcare,
    Insurance,
    Subscriptions,
    Entertainment,
    Shopping,
    Education,
    Travel,
    PersonalCare,
    Gifts,
    Savings,
    Salary,
    Investments,
    Other,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 18] = [
        CategoryKind::Housing,
        CategoryKind::Utilities,
        CategoryKind::Groceries,
        CategoryKind::Dining,
        CategoryKind::Transport,
        CategoryKind::Healthcare,
        CategoryKind::Insurance,
        CategoryKind::Subscriptions,
        CategoryKind::Entertainment,
        CategoryKind::Shopping,
        CategoryKind::Education,
        CategoryKind::Travel,
        CategoryKind::PersonalCare,
        CategoryKind::Gifts,
        CategoryKind::Savings,
        CategoryKind::Salary,
        CategoryKind::Investments,
        CategoryKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Housing => "Housing",
            CategoryKind::Utilities => "Utilities",
            CategoryKind::Groceries => "Groceries",
            CategoryKind::Dining => "Dining",
            CategoryKind::Transport => "Transport",
            CategoryKind::Healthcare => "Healthcare",
            CategoryKind::Insurance => "Insurance",
            CategoryKind::Subscriptions => "Subscriptions",
            CategoryKind::Entertainment => "Entertainment",
            CategoryKind::Shopping => "Shopping",
            CategoryKind::Education => "Education",
            CategoryKind::Travel => "Travel",
            CategoryKind::PersonalCare => "Personal Care",
            CategoryKind::Gifts => "Gifts",
            CategoryKind::Savings => "Savings",
            CategoryKind::Salary => "Salary",
            CategoryKind::Investments => "Investments",
            CategoryKind::Other => "Other",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Granularity of a category budget. Only monthly budgets exist today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
}

/// A budget allocation for one category kind.
///
/// `spent_amount` is derived state: only the budget recalculation service
/// writes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategoryRecord {
    pub id: Uuid,
    pub kind: CategoryKind,
    pub budgeted_amount: Decimal,
    #[serde(default)]
    pub(crate) spent_amount: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    #[serde(default = "BudgetCategoryRecord::default_active")]
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl BudgetCategoryRecord {
    pub fn new(kind: CategoryKind, budgeted_amount: Decimal) -> Result<Self, EngineError> {
        if budgeted_amount < Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "budget for {} cannot be negative ({})",
                kind, budgeted_amount
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            budgeted_amount,
            spent_amount: Decimal::ZERO,
            period: BudgetPeriod::Monthly,
            is_active: true,
            updated_at: Utc::now(),
        })
    }

    pub fn spent_amount(&self) -> Decimal {
        self.spent_amount
    }

    /// Remaining allowance for the period; negative once overspent.
    pub fn remaining(&self) -> Decimal {
        self.budgeted_amount - self.spent_amount
    }

    pub fn is_valid(&self) -> bool {
        self.budgeted_amount >= Decimal::ZERO
    }

    pub fn default_active() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_order_by_declaration() {
        let mut kinds = vec![CategoryKind::Other, CategoryKind::Groceries, CategoryKind::Housing];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![CategoryKind::Housing, CategoryKind::Groceries, CategoryKind::Other]
        );
        assert_eq!(CategoryKind::ALL.len(), 18);
    }

    #[test]
    fn negative_budget_is_rejected() {
        assert!(BudgetCategoryRecord::new(CategoryKind::Dining, dec!(-1)).is_err());
        let record = BudgetCategoryRecord::new(CategoryKind::Dining, dec!(150)).unwrap();
        assert_eq!(record.spent_amount(), Decimal::ZERO);
        assert_eq!(record.remaining(), dec!(150));
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&CategoryKind::PersonalCare).unwrap();
        assert_eq!(json, "\"personal_care\"");
    }
}
