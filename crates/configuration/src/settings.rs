use crate::error::ConfigError;
use crate::logging::LogLevel;
use crate::optimizer_config::ParameterRange;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: Simulation,
    pub olmar: OlmarParams,
    pub logging: Logging,
}

impl Config {
    /// Checks every section for values the strategy would reject later on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.olmar.validate()
    }
}

/// Contains parameters for the day-by-day simulation driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// First live day to simulate.
    pub start: usize,
    /// One past the last live day to simulate. `None` runs to the end of the data.
    pub stop: Option<usize>,
    /// Rebalance the portfolio every `rebal_interval` days.
    pub rebal_interval: usize,
    /// Whether the hyperparameters are periodically re-tuned.
    pub tuning_enabled: bool,
    /// Re-tune every `tune_interval` days.
    pub tune_interval: usize,
    /// Dollar value of the portfolio on the first simulated day.
    pub initial_capital: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            start: 0,
            stop: None,
            rebal_interval: 1,
            tuning_enabled: true,
            tune_interval: 15,
            initial_capital: 1.0,
        }
    }
}

impl Simulation {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rebal_interval == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.rebal_interval must be at least 1".to_string(),
            ));
        }
        if self.tuning_enabled && self.tune_interval == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.tune_interval must be at least 1".to_string(),
            ));
        }
        if let Some(stop) = self.stop {
            if stop <= self.start {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.stop ({}) must be greater than simulation.start ({})",
                    stop, self.start
                )));
            }
        }
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::ValidationError(
                "simulation.initial_capital must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the OLMAR strategy and the candidate grid it is tuned over.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OlmarParams {
    /// Moving-average window, in days.
    pub window: usize,
    /// Reversion threshold. Must be greater than one.
    pub eps: f64,
    pub window_range: ParameterRange,
    pub eps_range: ParameterRange,
}

impl Default for OlmarParams {
    fn default() -> Self {
        Self {
            window: 10,
            eps: 1.3,
            window_range: ParameterRange::LinearInt {
                start: 5,
                end: 30,
                step: 3,
            },
            eps_range: ParameterRange::LinearDecimal {
                start: dec!(1.1),
                end: dec!(5.1),
                step: dec!(0.2),
            },
        }
    }
}

impl OlmarParams {
    /// The window candidates, in the order they will be tried.
    pub fn window_candidates(&self) -> Result<Vec<usize>, ConfigError> {
        self.window_range
            .int_values("olmar.window_range")?
            .into_iter()
            .map(|w| {
                usize::try_from(w).ok().filter(|&w| w >= 1).ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "olmar.window_range contains {}, windows must be at least 1",
                        w
                    ))
                })
            })
            .collect()
    }

    /// The epsilon candidates, in the order they will be tried.
    pub fn eps_candidates(&self) -> Result<Vec<f64>, ConfigError> {
        self.eps_range
            .decimal_values("olmar.eps_range")?
            .into_iter()
            .map(|eps| {
                eps.to_f64().filter(|&e| e > 1.0).ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "olmar.eps_range contains {}, epsilon must be greater than 1",
                        eps
                    ))
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window < 1 {
            return Err(ConfigError::ValidationError(
                "olmar.window must be at least 1".to_string(),
            ));
        }
        if !(self.eps > 1.0) {
            return Err(ConfigError::ValidationError(
                "olmar.eps must be greater than 1".to_string(),
            ));
        }
        if self.window_candidates()?.is_empty() || self.eps_candidates()?.is_empty() {
            return Err(ConfigError::ValidationError(
                "olmar.window_range and olmar.eps_range must each yield at least one value"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: LogLevel,
    /// If set, logs are additionally written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            directory: None,
            file_prefix: "olmar.log".to_string(),
        }
    }
}
