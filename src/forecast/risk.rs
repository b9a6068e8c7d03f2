//! Budget overspend classification for forecasts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::CategoryForecast;
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// No positive budget; excluded from risk ranking.
    NoBudget,
    OnTrack,
    Approaching,
    AtRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub band: RiskBand,
    pub overspend_amount: Decimal,
    /// Predicted spend as a percentage of budget; zero when there is no budget.
    pub predicted_utilisation: Decimal,
}

impl RiskAssessment {
    pub fn at_risk(&self) -> bool {
        self.band == RiskBand::AtRisk
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    pub approaching_utilisation: Decimal,
    pub amount_scale: u32,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RiskClassifier {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            approaching_utilisation: config.approaching_utilisation,
            amount_scale: config.amount_scale,
        }
    }

    pub fn assess(&self, predicted_spend: Decimal, budget_amount: Decimal) -> RiskAssessment {
        if budget_amount <= Decimal::ZERO {
            return RiskAssessment {
                band: RiskBand::NoBudget,
                overspend_amount: Decimal::ZERO,
                predicted_utilisation: Decimal::ZERO,
            };
        }

        let utilisation = (predicted_spend / budget_amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(self.amount_scale, RoundingStrategy::MidpointAwayFromZero);
        let overspend = (predicted_spend - budget_amount).max(Decimal::ZERO);
        let band = if predicted_spend > budget_amount {
            RiskBand::AtRisk
        } else if utilisation >= self.approaching_utilisation {
            RiskBand::Approaching
        } else {
            RiskBand::OnTrack
        };

        RiskAssessment {
            band,
            overspend_amount: overspend,
            predicted_utilisation: utilisation,
        }
    }
}

/// Forecasts predicted to exceed their budget, largest overspend first.
/// Ties fall back to category order.
pub fn at_risk_categories(forecasts: &[CategoryForecast]) -> Vec<CategoryForecast> {
    let mut at_risk: Vec<CategoryForecast> = forecasts
        .iter()
        .filter(|forecast| forecast.risk == RiskBand::AtRisk)
        .cloned()
        .collect();
    at_risk.sort_by(|a, b| {
        b.overspend_amount
            .cmp(&a.overspend_amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    at_risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{Confidence, Trend};
    use crate::ledger::CategoryKind;
    use rust_decimal_macros::dec;

    fn forecast(category: CategoryKind, predicted: Decimal, budget: Decimal) -> CategoryForecast {
        let assessment = RiskClassifier::default().assess(predicted, budget);
        CategoryForecast {
            category,
            average_spend: predicted,
            predicted_spend: predicted,
            budget_amount: budget,
            trend: Trend::Stable,
            confidence: Confidence::Medium,
            predicted_utilisation: assessment.predicted_utilisation,
            overspend_amount: assessment.overspend_amount,
            risk: assessment.band,
            months_of_history: 6,
        }
    }

    #[test]
    fn overspend_is_flagged_with_magnitude() {
        let assessment = RiskClassifier::default().assess(dec!(250), dec!(200));
        assert!(assessment.at_risk());
        assert_eq!(assessment.overspend_amount, dec!(50));
        assert_eq!(assessment.predicted_utilisation, dec!(125));
    }

    #[test]
    fn within_budget_is_not_at_risk() {
        let classifier = RiskClassifier::default();
        let exact = classifier.assess(dec!(200), dec!(200));
        assert!(!exact.at_risk());
        assert_eq!(exact.band, RiskBand::Approaching);
        assert_eq!(exact.overspend_amount, Decimal::ZERO);

        let low = classifier.assess(dec!(50), dec!(200));
        assert_eq!(low.band, RiskBand::OnTrack);
        assert_eq!(low.predicted_utilisation, dec!(25));
    }

    #[test]
    fn zero_budget_is_excluded() {
        let assessment = RiskClassifier::default().assess(dec!(80), Decimal::ZERO);
        assert_eq!(assessment.band, RiskBand::NoBudget);
        assert_eq!(assessment.predicted_utilisation, Decimal::ZERO);
        assert!(!assessment.at_risk());
    }

    #[test]
    fn ranking_is_by_overspend_then_category() {
        let forecasts = vec![
            forecast(CategoryKind::Dining, dec!(260), dec!(200)),
            forecast(CategoryKind::Travel, dec!(500), dec!(300)),
            forecast(CategoryKind::Groceries, dec!(460), dec!(400)),
            forecast(CategoryKind::Housing, dec!(900), dec!(1000)),
            forecast(CategoryKind::Shopping, dec!(90), Decimal::ZERO),
        ];
        let ranked: Vec<_> = at_risk_categories(&forecasts)
            .into_iter()
            .map(|forecast| forecast.category)
            .collect();
        assert_eq!(
            ranked,
            vec![CategoryKind::Travel, CategoryKind::Groceries, CategoryKind::Dining]
        );
    }
}
