//! # OLMAR Strategy Library
//!
//! This crate contains the allocation logic of the system. It defines a universal
//! `PortfolioStrategy` trait and the Online Moving Average Reversion strategy (`Olmar`).
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no knowledge of files, the simulation loop or tuning. It depends
//!   only on `core-types` and `configuration`.
//! - **Strategy agnostic driver:** the `backtester` drives any `PortfolioStrategy`
//!   day by day without knowing its internals.
//!
//! ## Public API
//!
//! - `PortfolioStrategy`: the trait the simulation driver calls.
//! - `Olmar`, `OlmarHyperparams`, `HyperparamGrid`, `HyperparamHistory`.
//! - The building blocks `extract_window`, `predict_price_relatives`, `compute_lambda`
//!   and `project_allocation`.

pub mod error;
pub mod olmar;

pub use error::StrategyError;
pub use olmar::hyperparams::{HyperparamGrid, HyperparamHistory, HyperparamsRecord, OlmarHyperparams};
pub use olmar::predictor::predict_price_relatives;
pub use olmar::projector::{MAX_LAMBDA, Projection, compute_lambda, project_allocation};
pub use olmar::window::{PriceWindow, extract_window};
pub use olmar::Olmar;

use core_types::MarketData;
use ndarray::Array1;

/// The trait every allocation rule implements.
///
/// The strategy owns its current allocation `b`. The driver asks for a new allocation
/// on each rebalance day and hands the accepted one back through `set_allocation`.
///
/// The `Send + Sync` bounds allow strategies to be evaluated on the optimizer's
/// worker threads.
pub trait PortfolioStrategy: Send + Sync {
    /// Computes the desired allocation for the end of `day`.
    ///
    /// # Arguments
    ///
    /// * `data` - The market data for the whole run.
    /// * `day` - Index into the live series.
    /// * `init` - True on the first simulated day.
    ///
    /// # Returns
    ///
    /// * `Ok(b)` - an allocation whose 1-norm is one.
    /// * `Err(StrategyError)` - if no allocation is defined for this day.
    fn get_new_allocation(
        &self,
        data: &MarketData,
        day: usize,
        init: bool,
    ) -> Result<Array1<f64>, StrategyError>;

    /// The allocation currently held.
    fn allocation(&self) -> &Array1<f64>;

    /// Replaces the allocation currently held.
    fn set_allocation(&mut self, b: Array1<f64>) -> Result<(), StrategyError>;
}
