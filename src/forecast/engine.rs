//! Recency-weighted spend prediction with trend extrapolation.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{
    risk::RiskClassifier,
    trend::{mean, non_zero_months, Trend, TrendAnalyzer, TrendReading},
    CategoryForecast, CategoryHistory,
};
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_spend: Decimal,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastEngine {
    pub decay_ratio: Decimal,
    pub extrapolation_dampening: Decimal,
    pub extrapolation_cap: Decimal,
    pub low_variance_cv: Decimal,
    pub high_variance_cv: Decimal,
    pub amount_scale: u32,
    pub trend: TrendAnalyzer,
    pub risk: RiskClassifier,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ForecastEngine {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            decay_ratio: config.decay_ratio,
            extrapolation_dampening: config.extrapolation_dampening,
            extrapolation_cap: config.extrapolation_cap,
            low_variance_cv: config.low_variance_cv,
            high_variance_cv: config.high_variance_cv,
            amount_scale: config.amount_scale,
            trend: TrendAnalyzer::from_config(config),
            risk: RiskClassifier::from_config(config),
        }
    }

    /// Runs trend analysis, prediction, and risk assessment for one category.
    pub fn forecast(&self, history: &CategoryHistory) -> CategoryForecast {
        let reading = self.trend.analyze(&history.monthly_totals);
        let prediction = self.predict(&history.monthly_totals, &reading);
        let assessment = self
            .risk
            .assess(prediction.predicted_spend, history.budget_amount);

        tracing::debug!(
            category = %history.category,
            trend = %reading.trend,
            confidence = %prediction.confidence,
            predicted = %prediction.predicted_spend,
            "category forecast"
        );

        CategoryForecast {
            category: history.category,
            average_spend: self.round(mean(&history.monthly_totals).max(Decimal::ZERO)),
            predicted_spend: prediction.predicted_spend,
            budget_amount: history.budget_amount,
            trend: reading.trend,
            confidence: prediction.confidence,
            predicted_utilisation: assessment.predicted_utilisation,
            overspend_amount: assessment.overspend_amount,
            risk: assessment.band,
            months_of_history: non_zero_months(&history.monthly_totals),
        }
    }

    /// Predicts next-period spend from `totals` (oldest first).
    pub fn predict(&self, totals: &[Decimal], reading: &TrendReading) -> Prediction {
        let average = mean(totals);
        if totals.is_empty() || average <= Decimal::ZERO {
            return Prediction {
                predicted_spend: Decimal::ZERO,
                confidence: Confidence::Low,
            };
        }

        let weighted = self.weighted_average(totals);
        let adjusted = match reading.trend {
            Trend::Increasing => weighted * (Decimal::ONE + self.adjustment(reading)),
            Trend::Decreasing => weighted * (Decimal::ONE - self.adjustment(reading)),
            Trend::Stable | Trend::Insufficient => weighted,
        };

        Prediction {
            predicted_spend: self.round(adjusted.max(Decimal::ZERO)),
            confidence: self.confidence(totals, average),
        }
    }

    /// Newest month weighs 1, each older month `decay_ratio` times the next.
    pub fn weighted_average(&self, totals: &[Decimal]) -> Decimal {
        let mut weight = Decimal::ONE;
        let mut weight_sum = Decimal::ZERO;
        let mut weighted_sum = Decimal::ZERO;
        for value in totals.iter().rev() {
            weighted_sum += *value * weight;
            weight_sum += weight;
            weight *= self.decay_ratio;
        }
        if weight_sum.is_zero() {
            Decimal::ZERO
        } else {
            weighted_sum / weight_sum
        }
    }

    fn adjustment(&self, reading: &TrendReading) -> Decimal {
        match reading.relative_change {
            Some(change) => {
                (change.abs() * self.extrapolation_dampening).min(self.extrapolation_cap)
            }
            None => self.extrapolation_cap,
        }
    }

    /// Compares the coefficient of variation against the thresholds without
    /// taking a square root: `stdev / mean < t` iff `variance / mean^2 < t^2`.
    fn confidence(&self, totals: &[Decimal], average: Decimal) -> Confidence {
        let populated = non_zero_months(totals);
        let cv_squared = totals
            .iter()
            .map(|value| {
                let deviation = *value / average - Decimal::ONE;
                deviation * deviation
            })
            .sum::<Decimal>()
            / Decimal::from(totals.len());
        let low = self.low_variance_cv * self.low_variance_cv;
        let high = self.high_variance_cv * self.high_variance_cv;

        if populated < 2 || cv_squared >= high {
            Confidence::Low
        } else if populated >= 3 && cv_squared < low {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.amount_scale, RoundingStrategy::MidpointAwayFromZero)
    }
}
