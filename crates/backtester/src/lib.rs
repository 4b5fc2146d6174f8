//! # OLMAR Backtester
//!
//! The day-by-day simulation driver. It owns the loop that the strategy itself knows
//! nothing about: initialising the allocation, the rebalance and retune cadences, and
//! the wealth and allocation histories.
//!
//! Two entry points share one loop:
//! - `simulate`: a pure, silent run with fixed hyperparameters. This is what the
//!   hyperparameter tuner fans out over.
//! - `Backtester`: the top-level run, with a progress bar, a final `PerformanceReport`
//!   and an optional `Retuner` invoked every `tune_interval` days.

use analytics::{AnalyticsEngine, PerformanceReport};
use core_types::MarketData;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use strategies::{HyperparamHistory, Olmar, OlmarHyperparams};

pub mod error;
pub mod simulation;

pub use error::{BacktestError, TuneFailure};
pub use simulation::{SimulationParams, SimulationResult, simulate};

/// Everything a `Retuner` may look at when it is invoked.
#[derive(Debug, Clone, Copy)]
pub struct TuneContext<'a> {
    pub data: &'a MarketData,
    /// First day of the run being tuned.
    pub run_start: usize,
    /// The day being simulated. Only days strictly before it are in the past.
    pub cur_day: usize,
    /// Allocations held on `run_start..cur_day`.
    pub allocations: &'a [Array1<f64>],
}

impl TuneContext<'_> {
    /// Number of days simulated so far.
    pub fn elapsed(&self) -> usize {
        self.cur_day - self.run_start
    }

    /// The allocation held on absolute live `day`, if it has already been simulated.
    pub fn allocation_at(&self, day: usize) -> Option<&Array1<f64>> {
        day.checked_sub(self.run_start)
            .and_then(|offset| self.allocations.get(offset))
    }
}

/// Periodically revises a strategy's hyperparameters during a run.
pub trait Retuner: Send + Sync {
    /// May replace the strategy's hyperparameters in place.
    ///
    /// Returns `Ok(true)` when new hyperparameters were adopted.
    fn retune(&self, strategy: &mut Olmar, ctx: &TuneContext<'_>) -> Result<bool, TuneFailure>;
}

/// Output of a top-level run.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub simulation: SimulationResult,
    pub report: PerformanceReport,
    pub hyperparams: OlmarHyperparams,
    pub history: HyperparamHistory,
}

/// The main backtesting engine.
pub struct Backtester {
    strategy: Olmar,
    params: SimulationParams,
    tuning: Option<(Box<dyn Retuner>, usize)>,
    analytics_engine: AnalyticsEngine,
    show_progress: bool,
}

impl Backtester {
    pub fn new(strategy: Olmar, params: SimulationParams, analytics_engine: AnalyticsEngine) -> Self {
        Self {
            strategy,
            params,
            tuning: None,
            analytics_engine,
            show_progress: false,
        }
    }

    /// Invokes `retuner` every `tune_interval` days.
    pub fn with_retuner(
        mut self,
        retuner: Box<dyn Retuner>,
        tune_interval: usize,
    ) -> Result<Self, BacktestError> {
        if tune_interval == 0 {
            return Err(BacktestError::InvalidParameters(
                "tune_interval must be at least 1".to_string(),
            ));
        }
        self.tuning = Some((retuner, tune_interval));
        Ok(self)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn strategy(&self) -> &Olmar {
        &self.strategy
    }

    /// Runs the simulation and summarises it.
    pub fn run(&mut self, data: &MarketData) -> Result<BacktestOutcome, BacktestError> {
        self.params.validate(data)?;

        let num_days = (self.params.stop - self.params.start) as u64;
        let progress_bar = if self.show_progress {
            let bar = ProgressBar::new(num_days);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        tracing::info!(
            start = self.params.start,
            stop = self.params.stop,
            window = self.strategy.hyperparams().window(),
            eps = self.strategy.hyperparams().eps(),
            tuning = self.tuning.is_some(),
            "Starting OLMAR simulation"
        );

        let run_start = self.params.start;
        let tuning = self.tuning.as_ref();
        let simulation = simulation::run_days(
            &mut self.strategy,
            data,
            &self.params,
            &progress_bar,
            |strategy, day, allocations| {
                let Some((retuner, tune_interval)) = tuning else {
                    return Ok(());
                };
                if (day - run_start) % tune_interval != 0 {
                    return Ok(());
                }
                let ctx = TuneContext {
                    data,
                    run_start,
                    cur_day: day,
                    allocations,
                };
                let adopted = retuner
                    .retune(strategy, &ctx)
                    .map_err(|source| BacktestError::Tuning { day, source })?;
                if adopted {
                    tracing::info!(
                        day,
                        window = strategy.hyperparams().window(),
                        eps = strategy.hyperparams().eps(),
                        "Adopted tuned hyperparameters"
                    );
                }
                Ok(())
            },
        )?;

        progress_bar.finish_with_message("Simulation complete.");

        let report = self.analytics_engine.calculate(&simulation.wealth)?;
        tracing::info!(
            final_wealth = report.final_wealth,
            sharpe = report.sharpe_ratio,
            "OLMAR simulation finished"
        );

        Ok(BacktestOutcome {
            simulation,
            report,
            hyperparams: self.strategy.hyperparams(),
            history: self.strategy.history().clone(),
        })
    }
}
