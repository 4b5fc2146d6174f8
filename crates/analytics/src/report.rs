use serde::{Deserialize, Serialize};

/// Summary of a finished simulation.
///
/// This struct is the final output of the `AnalyticsEngine` and is what gets printed
/// and persisted at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub initial_wealth: f64,
    pub final_wealth: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    /// Mean over standard deviation of the per-period returns (not annualised).
    pub sharpe_ratio: f64,
    pub num_periods: usize,
}

impl PerformanceReport {
    /// Creates a report for a series that never moved from `initial_wealth`.
    pub fn flat(initial_wealth: f64) -> Self {
        Self {
            initial_wealth,
            final_wealth: initial_wealth,
            total_return_pct: 0.0,
            max_drawdown_pct: 0.0,
            sharpe_ratio: 0.0,
            num_periods: 0,
        }
    }
}
