//! # OLMAR Hyperparameter Tuner
//!
//! Finds the best constant `(window, eps)` in hindsight over the last
//! `TUNE_DURATION` days by re-running the strategy once per grid point and keeping the
//! pair with the highest Sharpe ratio. Grid points are simulated in parallel.

use crate::generator::generate_parameter_sets;
use analytics::empirical_sharpe_ratio;
use backtester::{Retuner, SimulationParams, TuneContext, TuneFailure, simulate};
use core_types::MarketData;
use ndarray::Array1;
use rayon::prelude::*;
use strategies::{HyperparamGrid, Olmar, OlmarHyperparams};

pub mod error;
pub mod generator;

pub use error::OptimizerError;

/// Number of trailing days every trial is scored over.
pub const TUNE_DURATION: usize = 10;

/// The realized score of one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialScore {
    pub hyperparams: OlmarHyperparams,
    pub sharpe_ratio: f64,
}

/// Grid-search tuner for `Olmar`.
#[derive(Debug, Clone)]
pub struct HyperparamTuner {
    duration: usize,
}

impl Default for HyperparamTuner {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperparamTuner {
    pub fn new() -> Self {
        Self {
            duration: TUNE_DURATION,
        }
    }

    pub fn duration(&self) -> usize {
        self.duration
    }

    /// Re-runs the strategy over `start_day..cur_day` for every grid point.
    ///
    /// Each trial starts from `init_b`, rebalances daily, never retunes itself and sees
    /// only the live series. Scores come back in grid order.
    pub fn score_grid(
        &self,
        data: &MarketData,
        grid: &HyperparamGrid,
        init_b: &Array1<f64>,
        start_day: usize,
        cur_day: usize,
    ) -> Result<Vec<TrialScore>, OptimizerError> {
        let candidates = generate_parameter_sets(grid)?;
        let trial_data = data.without_training();
        let params = SimulationParams {
            start: start_day,
            stop: cur_day,
            rebal_interval: 1,
            initial_capital: 1.0,
            init_b: Some(init_b.clone()),
        };

        tracing::debug!(
            trials = candidates.len(),
            start_day,
            cur_day,
            threads = rayon::current_num_threads(),
            "Scoring hyperparameter grid"
        );

        candidates
            .par_iter()
            .map(|&hyperparams| -> Result<TrialScore, OptimizerError> {
                let result = simulate(&trial_data, hyperparams, &params).map_err(|source| {
                    OptimizerError::Trial {
                        window: hyperparams.window(),
                        eps: hyperparams.eps(),
                        source,
                    }
                })?;
                Ok(TrialScore {
                    hyperparams,
                    sharpe_ratio: empirical_sharpe_ratio(result.dollars_history()),
                })
            })
            .collect()
    }

    /// Adopts the best hyperparameters of the trailing period, if enough days have passed.
    ///
    /// Returns `Ok(false)` without touching the strategy when fewer than `duration` days
    /// have been simulated. On error the strategy is left unchanged.
    pub fn tune_hyperparams(
        &self,
        strategy: &mut Olmar,
        ctx: &TuneContext<'_>,
    ) -> Result<bool, OptimizerError> {
        if ctx.elapsed() < self.duration {
            tracing::debug!(
                cur_day = ctx.cur_day,
                elapsed = ctx.elapsed(),
                "Not enough history to tune yet"
            );
            return Ok(false);
        }

        let start_day = ctx.cur_day - self.duration;
        let init_b = ctx
            .allocation_at(start_day)
            .ok_or(OptimizerError::MissingAllocation(start_day))?;

        let scores = self.score_grid(ctx.data, strategy.grid(), init_b, start_day, ctx.cur_day)?;
        let best = select_best(&scores).ok_or_else(|| {
            OptimizerError::ParameterGeneration("no trial was scored".to_string())
        })?;

        tracing::info!(
            cur_day = ctx.cur_day,
            window = best.hyperparams.window(),
            eps = best.hyperparams.eps(),
            sharpe = best.sharpe_ratio,
            "Selected hyperparameters"
        );
        strategy.adopt_hyperparams(best.hyperparams);
        Ok(true)
    }
}

impl Retuner for HyperparamTuner {
    fn retune(&self, strategy: &mut Olmar, ctx: &TuneContext<'_>) -> Result<bool, TuneFailure> {
        Ok(self.tune_hyperparams(strategy, ctx)?)
    }
}

/// The first score with the strictly greatest Sharpe ratio.
pub fn select_best(scores: &[TrialScore]) -> Option<&TrialScore> {
    scores.iter().fold(None, |best, score| match best {
        Some(current) if current.sharpe_ratio >= score.sharpe_ratio => Some(current),
        _ => Some(score),
    })
}
