use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

const CONFIG_FILE_NAME: &str = "engine.json";
const CONFIG_DIR_NAME: &str = "budget_forecast";
const TMP_SUFFIX: &str = "tmp";
const MAX_HISTORY_WINDOW: usize = 120;
const MAX_PENDING_WINDOW_DAYS: i64 = 366;

/// Tunable constants for the forecasting and scheduling heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of monthly totals fed to the trend and forecast stages.
    pub history_window: usize,
    /// Counts the (partial) month containing the reference date as history.
    pub include_current_month: bool,
    /// Relative change between half-window means that counts as a trend.
    pub trend_band: Decimal,
    /// Geometric weight ratio applied per month of age.
    pub decay_ratio: Decimal,
    /// Share of the observed relative change carried into the prediction.
    pub extrapolation_dampening: Decimal,
    /// Upper bound on the relative bump or reduction applied for a trend.
    pub extrapolation_cap: Decimal,
    /// Coefficient of variation below which a forecast may be `high` confidence.
    pub low_variance_cv: Decimal,
    /// Coefficient of variation at or above which a forecast is `low` confidence.
    pub high_variance_cv: Decimal,
    /// Predicted utilisation (percent) at which a category is flagged as approaching its budget.
    pub approaching_utilisation: Decimal,
    /// Catch-up limit for a single scheduling run, in years of periods.
    pub max_catch_up_years: u32,
    /// Days ahead of the reference date that count as pending.
    pub pending_window_days: i64,
    /// Decimal places kept on reported amounts.
    pub amount_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: 6,
            include_current_month: false,
            trend_band: Decimal::new(10, 2),
            decay_ratio: Decimal::new(7, 1),
            extrapolation_dampening: Decimal::new(5, 1),
            extrapolation_cap: Decimal::new(25, 2),
            low_variance_cv: Decimal::new(25, 2),
            high_variance_cv: Decimal::new(50, 2),
            approaching_utilisation: Decimal::from(90),
            max_catch_up_years: 10,
            pending_window_days: 7,
            amount_scale: 2,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.history_window == 0 || self.history_window > MAX_HISTORY_WINDOW {
            return Err(invalid("history_window must be within [1, 120]"));
        }
        if self.trend_band < Decimal::ZERO || self.trend_band >= Decimal::ONE {
            return Err(invalid("trend_band must be within [0, 1)"));
        }
        if self.decay_ratio <= Decimal::ZERO || self.decay_ratio >= Decimal::ONE {
            return Err(invalid("decay_ratio must be within (0, 1)"));
        }
        if self.extrapolation_dampening < Decimal::ZERO
            || self.extrapolation_dampening > Decimal::ONE
        {
            return Err(invalid("extrapolation_dampening must be within [0, 1]"));
        }
        if self.extrapolation_cap < Decimal::ZERO || self.extrapolation_cap >= Decimal::ONE {
            return Err(invalid("extrapolation_cap must be within [0, 1)"));
        }
        if self.low_variance_cv <= Decimal::ZERO || self.high_variance_cv < self.low_variance_cv {
            return Err(invalid(
                "variance thresholds must be positive and low_variance_cv <= high_variance_cv",
            ));
        }
        if self.approaching_utilisation <= Decimal::ZERO {
            return Err(invalid("approaching_utilisation must be positive"));
        }
        if self.max_catch_up_years == 0 {
            return Err(invalid("max_catch_up_years must be at least 1"));
        }
        if !(0..=MAX_PENDING_WINDOW_DAYS).contains(&self.pending_window_days) {
            return Err(invalid("pending_window_days must be within [0, 366]"));
        }
        if self.amount_scale > 10 {
            return Err(invalid("amount_scale cannot exceed 10"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> EngineError {
    EngineError::InvalidConfig(message.to_string())
}

/// Loads and stores [`EngineConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses the platform configuration directory, falling back to the home directory.
    pub fn from_default_location() -> Self {
        Self::new(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns defaults when no file exists yet. Loaded values are validated.
    pub fn load(&self) -> Result<EngineConfig, EngineError> {
        if !self.path.exists() {
            return Ok(EngineConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: EngineConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> Result<(), EngineError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), EngineError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
