//! Online Moving Average Reversion.
//!
//! Li and Hoi, "On-Line Portfolio Selection with Moving Average Reversion", ICML 2012.
//! Each rebalance day the strategy predicts tomorrow's price relatives from a moving
//! average and takes the smallest step that would lift the predicted return of the
//! portfolio to `eps`.

pub mod hyperparams;
pub mod predictor;
pub mod projector;
pub mod window;

use crate::PortfolioStrategy;
use crate::error::StrategyError;
use configuration::OlmarParams;
use core_types::{MarketData, availability_mask, uniform_allocation};
use hyperparams::{HyperparamGrid, HyperparamHistory, HyperparamsRecord, OlmarHyperparams};
use ndarray::Array1;
use predictor::predict_price_relatives;
use projector::project_allocation;

/// The OLMAR portfolio.
#[derive(Debug, Clone)]
pub struct Olmar {
    num_assets: usize,
    b: Array1<f64>,
    hyperparams: OlmarHyperparams,
    history: HyperparamHistory,
    grid: HyperparamGrid,
}

impl Olmar {
    /// Creates a new `Olmar` holding a uniform allocation over `num_assets`.
    pub fn new(
        num_assets: usize,
        hyperparams: OlmarHyperparams,
        grid: HyperparamGrid,
    ) -> Result<Self, StrategyError> {
        if num_assets == 0 {
            return Err(StrategyError::InvalidParameters(
                "the asset universe is empty".to_string(),
            ));
        }
        Ok(Self {
            num_assets,
            b: Array1::from_elem(num_assets, 1.0 / num_assets as f64),
            hyperparams,
            history: HyperparamHistory::new(hyperparams),
            grid,
        })
    }

    /// Builds the strategy from the `[olmar]` section of the configuration.
    pub fn from_config(num_assets: usize, params: &OlmarParams) -> Result<Self, StrategyError> {
        let hyperparams = OlmarHyperparams::new(params.window, params.eps)?;
        let grid = HyperparamGrid::from_config(params)?;
        Self::new(num_assets, hyperparams, grid)
    }

    /// A strategy that is never tuned: its grid is the single given pair.
    pub fn fixed(num_assets: usize, hyperparams: OlmarHyperparams) -> Result<Self, StrategyError> {
        let grid = HyperparamGrid::new(vec![hyperparams.window()], vec![hyperparams.eps()])?;
        Self::new(num_assets, hyperparams, grid)
    }

    pub fn hyperparams(&self) -> OlmarHyperparams {
        self.hyperparams
    }

    pub fn history(&self) -> &HyperparamHistory {
        &self.history
    }

    pub fn grid(&self) -> &HyperparamGrid {
        &self.grid
    }

    /// Makes `params` the current hyperparameters and appends them to the history.
    pub fn adopt_hyperparams(&mut self, params: OlmarHyperparams) {
        self.hyperparams = params;
        self.history.push(params);
    }

    /// Current hyperparameters in their persisted form.
    pub fn hyperparams_record(&self) -> HyperparamsRecord {
        HyperparamsRecord::from(self.hyperparams)
    }

    fn check_universe(&self, data: &MarketData) -> Result<(), StrategyError> {
        if data.num_assets() != self.num_assets {
            return Err(StrategyError::InvalidParameters(format!(
                "strategy tracks {} assets but the market data has {}",
                self.num_assets,
                data.num_assets()
            )));
        }
        Ok(())
    }
}

impl PortfolioStrategy for Olmar {
    /// Determines the desired allocation for the end of `day`.
    ///
    /// On the first day of a run without training data there is no history to revert
    /// to, so the allocation is uniform over the assets that can be traded.
    fn get_new_allocation(
        &self,
        data: &MarketData,
        day: usize,
        init: bool,
    ) -> Result<Array1<f64>, StrategyError> {
        self.check_universe(data)?;
        let today_op = data.live().open(day)?;
        let available = availability_mask(today_op);

        if !available.iter().any(|&avail| avail) {
            return Err(StrategyError::DegenerateAllocation {
                day,
                reason: "no asset has a usable opening price".to_string(),
            });
        }

        if init && data.train().is_none() {
            return Ok(uniform_allocation(self.num_assets, today_op)?);
        }

        let ppr = predict_price_relatives(data, day, self.hyperparams.window())?;
        let projection = project_allocation(day, &ppr, &self.b, &available, self.hyperparams.eps())?;

        tracing::debug!(
            day,
            lambda = projection.lambda,
            mean_ppr = projection.mean_ppr,
            "OLMAR: projected new allocation"
        );

        Ok(projection.allocation)
    }

    fn allocation(&self) -> &Array1<f64> {
        &self.b
    }

    fn set_allocation(&mut self, b: Array1<f64>) -> Result<(), StrategyError> {
        if b.len() != self.num_assets {
            return Err(StrategyError::InvalidParameters(format!(
                "allocation has {} weights, expected {}",
                b.len(),
                self.num_assets
            )));
        }
        self.b = b;
        Ok(())
    }
}
