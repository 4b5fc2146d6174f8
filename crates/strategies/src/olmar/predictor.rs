use crate::error::StrategyError;
use crate::olmar::window::extract_window;
use core_types::{MarketData, silent_divide};
use ndarray::{Array1, Axis};

/// Predicts the close/open relative of every asset on `day`.
///
/// The prediction is the moving average of the trailing closes and today's open,
/// divided by today's open:
///
/// `x(t+1) = (p(t) + p(t-1) + ... + p(t-w)) / ((w + 1) * p(t))`
///
/// where `p(t)` is the open of `day` and the other prices are closes. Assets whose open
/// is missing or non-positive get a predicted relative of zero.
pub fn predict_price_relatives(
    data: &MarketData,
    day: usize,
    window: usize,
) -> Result<Array1<f64>, StrategyError> {
    let prices = extract_window(data, day, window)?;
    let num_points = (prices.closes.nrows() + 1) as f64;
    let avg_prices = (prices.closes.sum_axis(Axis(0)) + &prices.today_open) / num_points;

    Ok(avg_prices
        .iter()
        .zip(prices.today_open.iter())
        .map(|(&avg, &open)| {
            if open > 0.0 {
                silent_divide(avg, open)
            } else {
                0.0
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PriceSeries;
    use ndarray::array;

    #[test]
    fn first_day_without_history_predicts_flat() {
        let live = PriceSeries::new(array![[10.0, 20.0]], array![[11.0, 19.0]]).unwrap();
        let data = MarketData::live_only(live);
        let ppr = predict_price_relatives(&data, 0, 5).unwrap();
        assert_eq!(ppr, array![1.0, 1.0]);
    }

    #[test]
    fn average_includes_todays_open() {
        let live = PriceSeries::new(
            array![[10.0, 10.0], [12.0, 8.0]],
            array![[14.0, 6.0], [12.0, 8.0]],
        )
        .unwrap();
        let data = MarketData::live_only(live);
        let ppr = predict_price_relatives(&data, 1, 1).unwrap();
        // (14 + 12) / 2 / 12 and (6 + 8) / 2 / 8
        assert!((ppr[0] - 13.0 / 12.0).abs() < 1e-12);
        assert!((ppr[1] - 7.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn unavailable_assets_predict_zero() {
        let live = PriceSeries::new(
            array![[10.0, 5.0, 3.0], [10.0, 0.0, -1.0]],
            array![[10.0, 5.0, 3.0], [10.0, 0.0, 0.0]],
        )
        .unwrap();
        let data = MarketData::live_only(live);
        let ppr = predict_price_relatives(&data, 1, 1).unwrap();
        assert_eq!(ppr, array![1.0, 0.0, 0.0]);
    }
}
