use crate::error::AnalyticsError;
use crate::report::PerformanceReport;

/// Sharpe ratio of the per-period returns of a wealth series.
///
/// Returns are `w[t] / w[t-1] - 1`; the risk-free rate is zero and the result is not
/// annualised. The standard deviation is the population one. Series with fewer than two
/// returns, or whose returns have no dispersion, score 0.0 so that every trial has a
/// comparable, finite score.
pub fn empirical_sharpe_ratio(wealth: &[f64]) -> f64 {
    let returns: Vec<f64> = wealth
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean_return = returns.iter().sum::<f64>() / n;
    let variance = returns
        .iter()
        .map(|r| (r - mean_return) * (r - mean_return))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 && std_dev.is_finite() && mean_return.is_finite() {
        mean_return / std_dev
    } else {
        0.0
    }
}

/// A stateless calculator for deriving performance metrics from a wealth series.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `wealth` - Portfolio value before the first simulated day followed by its value
    ///   after each simulated day.
    pub fn calculate(&self, wealth: &[f64]) -> Result<PerformanceReport, AnalyticsError> {
        let Some(&initial_wealth) = wealth.first() else {
            return Err(AnalyticsError::NotEnoughData(
                "wealth series is empty".to_string(),
            ));
        };
        if let Some(idx) = wealth.iter().position(|w| !w.is_finite()) {
            return Err(AnalyticsError::NonFiniteWealth(idx));
        }

        let mut report = PerformanceReport::flat(initial_wealth);
        if wealth.len() == 1 {
            return Ok(report);
        }

        let final_wealth = wealth[wealth.len() - 1];
        report.final_wealth = final_wealth;
        report.num_periods = wealth.len() - 1;
        if initial_wealth != 0.0 {
            report.total_return_pct = (final_wealth / initial_wealth - 1.0) * 100.0;
        }
        report.max_drawdown_pct = max_drawdown_pct(wealth);
        report.sharpe_ratio = empirical_sharpe_ratio(wealth);

        tracing::debug!(?report, "Calculated performance report");
        Ok(report)
    }
}

/// Largest peak-to-trough decline, as a percentage of the peak.
fn max_drawdown_pct(wealth: &[f64]) -> f64 {
    let mut peak = wealth[0];
    let mut max_drawdown = 0.0_f64;
    for &value in wealth {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - value) / peak);
        }
    }
    max_drawdown * 100.0
}
