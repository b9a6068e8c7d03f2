//! Two-window trend classification over monthly totals.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Insufficient,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::Insufficient => "insufficient data",
        };
        f.write_str(label)
    }
}

/// Classification plus the half-window means it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendReading {
    pub trend: Trend,
    pub older_mean: Decimal,
    pub recent_mean: Decimal,
    /// `(recent - older) / older`; `None` when the older half averages zero.
    pub relative_change: Option<Decimal>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer {
    /// Relative band around the older mean treated as stable.
    pub band: Decimal,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn new(band: Decimal) -> Self {
        Self { band }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.trend_band)
    }

    /// `totals` is ordered oldest first. The recent half takes the last
    /// `ceil(n / 2)` months.
    pub fn analyze(&self, totals: &[Decimal]) -> TrendReading {
        let recent_len = totals.len().div_ceil(2);
        let (older, recent) = totals.split_at(totals.len() - recent_len);
        let older_mean = mean(older);
        let recent_mean = mean(recent);
        let relative_change = if older_mean.is_zero() {
            None
        } else {
            Some((recent_mean - older_mean) / older_mean)
        };

        let trend = if non_zero_months(totals) < 2 {
            Trend::Insufficient
        } else if recent_mean > older_mean * (Decimal::ONE + self.band) {
            Trend::Increasing
        } else if recent_mean < older_mean * (Decimal::ONE - self.band) {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        TrendReading {
            trend,
            older_mean,
            recent_mean,
            relative_change,
        }
    }

    pub fn classify(&self, totals: &[Decimal]) -> Trend {
        self.analyze(totals).trend
    }
}

pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

pub(crate) fn non_zero_months(values: &[Decimal]) -> usize {
    values.iter().filter(|value| !value.is_zero()).count()
}
