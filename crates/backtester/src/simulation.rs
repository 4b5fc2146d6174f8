use crate::error::BacktestError;
use configuration::Simulation;
use core_types::MarketData;
use indicatif::ProgressBar;
use ndarray::Array1;
use strategies::{Olmar, OlmarHyperparams, PortfolioStrategy};

/// What to simulate: which live days, how often to rebalance and where to start from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub start: usize,
    /// One past the last simulated day.
    pub stop: usize,
    pub rebal_interval: usize,
    pub initial_capital: f64,
    /// Allocation held on the first day. When absent the strategy picks it.
    pub init_b: Option<Array1<f64>>,
}

impl SimulationParams {
    /// Builds parameters from the `[simulation]` section, running to the end of the data
    /// when no stop day is configured.
    pub fn from_config(settings: &Simulation, num_days: usize) -> Self {
        Self {
            start: settings.start,
            stop: settings.stop.unwrap_or(num_days),
            rebal_interval: settings.rebal_interval,
            initial_capital: settings.initial_capital,
            init_b: None,
        }
    }

    pub(crate) fn validate(&self, data: &MarketData) -> Result<(), BacktestError> {
        if self.start >= self.stop || self.stop > data.num_days() {
            return Err(BacktestError::InvalidRange {
                start: self.start,
                stop: self.stop,
                num_days: data.num_days(),
            });
        }
        if self.rebal_interval == 0 {
            return Err(BacktestError::InvalidParameters(
                "rebal_interval must be at least 1".to_string(),
            ));
        }
        if !(self.initial_capital > 0.0) {
            return Err(BacktestError::InvalidParameters(
                "initial_capital must be positive".to_string(),
            ));
        }
        if let Some(b) = &self.init_b {
            if b.len() != data.num_assets() {
                return Err(BacktestError::InvalidParameters(format!(
                    "initial allocation has {} weights for {} assets",
                    b.len(),
                    data.num_assets()
                )));
            }
        }
        Ok(())
    }
}

/// Wealth and allocation history of a finished simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub start: usize,
    /// Initial capital followed by the wealth at the close of every simulated day.
    pub wealth: Vec<f64>,
    /// Allocation held on every simulated day, oldest first.
    pub allocations: Vec<Array1<f64>>,
}

impl SimulationResult {
    /// The allocation held on absolute live `day`.
    pub fn allocation_at(&self, day: usize) -> Option<&Array1<f64>> {
        day.checked_sub(self.start)
            .and_then(|offset| self.allocations.get(offset))
    }

    pub fn dollars_history(&self) -> &[f64] {
        &self.wealth
    }

    pub fn final_wealth(&self) -> f64 {
        self.wealth.last().copied().unwrap_or_default()
    }
}

/// Runs OLMAR with fixed hyperparameters over `params.start..params.stop`.
///
/// The run owns its own strategy state, so independent calls can be evaluated in
/// parallel over the same market data.
pub fn simulate(
    data: &MarketData,
    hyperparams: OlmarHyperparams,
    params: &SimulationParams,
) -> Result<SimulationResult, BacktestError> {
    let mut strategy = Olmar::fixed(data.num_assets(), hyperparams)?;
    run_days(
        &mut strategy,
        data,
        params,
        &ProgressBar::hidden(),
        |_, _, _| Ok(()),
    )
}

/// The day loop shared by `simulate` and the `Backtester`.
///
/// `before_rebalance` runs on every day after the first, before the strategy is asked
/// for a new allocation, and sees the allocations held so far.
pub(crate) fn run_days<S, F>(
    strategy: &mut S,
    data: &MarketData,
    params: &SimulationParams,
    progress_bar: &ProgressBar,
    mut before_rebalance: F,
) -> Result<SimulationResult, BacktestError>
where
    S: PortfolioStrategy,
    F: FnMut(&mut S, usize, &[Array1<f64>]) -> Result<(), BacktestError>,
{
    params.validate(data)?;

    let num_days = params.stop - params.start;
    let mut wealth = Vec::with_capacity(num_days + 1);
    let mut allocations = Vec::with_capacity(num_days);
    let mut dollars = params.initial_capital;
    wealth.push(dollars);

    for day in params.start..params.stop {
        let offset = day - params.start;

        if offset == 0 {
            let b = match &params.init_b {
                Some(b) => b.clone(),
                None => strategy.get_new_allocation(data, day, true)?,
            };
            strategy.set_allocation(b)?;
        } else {
            before_rebalance(strategy, day, &allocations)?;
            if offset % params.rebal_interval == 0 {
                let b = strategy.get_new_allocation(data, day, false)?;
                strategy.set_allocation(b)?;
            }
        }

        let b = strategy.allocation().clone();
        let relatives = data.live().price_relatives(day)?;
        dollars *= b.dot(&relatives);

        tracing::trace!(day, dollars, "Recorded end-of-day wealth");
        wealth.push(dollars);
        allocations.push(b);
        progress_bar.inc(1);
    }

    Ok(SimulationResult {
        start: params.start,
        wealth,
        allocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PriceSeries;
    use ndarray::array;

    fn data() -> MarketData {
        MarketData::live_only(
            PriceSeries::new(
                array![[10.0, 10.0], [10.0, 10.0], [10.0, 10.0]],
                array![[11.0, 9.0], [12.0, 10.0], [10.0, 10.0]],
            )
            .unwrap(),
        )
    }

    fn params(start: usize, stop: usize) -> SimulationParams {
        SimulationParams {
            start,
            stop,
            rebal_interval: 1,
            initial_capital: 1.0,
            init_b: None,
        }
    }

    #[test]
    fn first_day_is_uniform_and_compounds() {
        let hp = OlmarHyperparams::new(1, 1.5).unwrap();
        let result = simulate(&data(), hp, &params(0, 1)).unwrap();
        assert_eq!(result.allocations[0], array![0.5, 0.5]);
        // 0.5 * 1.1 + 0.5 * 0.9
        assert!((result.final_wealth() - 1.0).abs() < 1e-12);
        assert_eq!(result.wealth.len(), 2);
    }

    #[test]
    fn init_b_is_held_on_the_first_day() {
        let hp = OlmarHyperparams::new(1, 1.5).unwrap();
        let p = SimulationParams {
            init_b: Some(array![1.0, 0.0]),
            ..params(0, 1)
        };
        let result = simulate(&data(), hp, &p).unwrap();
        assert!((result.final_wealth() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn allocation_lookup_uses_absolute_days() {
        let hp = OlmarHyperparams::new(1, 1.5).unwrap();
        let result = simulate(&data(), hp, &params(1, 3)).unwrap();
        assert!(result.allocation_at(0).is_none());
        assert!(result.allocation_at(1).is_some());
        assert!(result.allocation_at(2).is_some());
        assert!(result.allocation_at(3).is_none());
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let hp = OlmarHyperparams::new(1, 1.5).unwrap();
        assert!(matches!(
            simulate(&data(), hp, &params(2, 2)),
            Err(BacktestError::InvalidRange { .. })
        ));
        assert!(matches!(
            simulate(&data(), hp, &params(0, 4)),
            Err(BacktestError::InvalidRange { .. })
        ));
        let p = SimulationParams {
            init_b: Some(array![1.0]),
            ..params(0, 1)
        };
        assert!(matches!(
            simulate(&data(), hp, &p),
            Err(BacktestError::InvalidParameters(_))
        ));
    }

    #[test]
    fn rebalance_interval_holds_allocation_between_rebalances() {
        let hp = OlmarHyperparams::new(1, 3.0).unwrap();
        let p = SimulationParams {
            rebal_interval: 2,
            ..params(0, 3)
        };
        let result = simulate(&data(), hp, &p).unwrap();
        // Day 1 is not a rebalance day.
        assert_eq!(result.allocations[0], result.allocations[1]);
    }
}
