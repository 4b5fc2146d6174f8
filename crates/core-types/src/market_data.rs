use crate::allocation::silent_divide;
use crate::error::CoreError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Raw row-major price data as it is stored on disk.
///
/// Each inner vector is one day; each column is one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFrame {
    pub opens: Vec<Vec<f64>>,
    pub closes: Vec<Vec<f64>>,
}

/// Daily open and close prices for a fixed universe of assets, indexed `(day, asset)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    opens: Array2<f64>,
    closes: Array2<f64>,
}

impl PriceSeries {
    /// Creates a new `PriceSeries`. Opens and closes must have identical shapes.
    pub fn new(opens: Array2<f64>, closes: Array2<f64>) -> Result<Self, CoreError> {
        if opens.dim() != closes.dim() {
            return Err(CoreError::ShapeMismatch {
                opens: opens.dim(),
                closes: closes.dim(),
            });
        }
        Ok(Self { opens, closes })
    }

    /// Builds a series from a row-major `PriceFrame`.
    pub fn from_frame(frame: &PriceFrame) -> Result<Self, CoreError> {
        let opens = rows_to_matrix("opens", &frame.opens)?;
        let closes = rows_to_matrix("closes", &frame.closes)?;
        Self::new(opens, closes)
    }

    pub fn num_days(&self) -> usize {
        self.opens.nrows()
    }

    pub fn num_assets(&self) -> usize {
        self.opens.ncols()
    }

    pub fn opens(&self) -> ArrayView2<'_, f64> {
        self.opens.view()
    }

    pub fn all_closes(&self) -> ArrayView2<'_, f64> {
        self.closes.view()
    }

    /// The opening price vector for `day`.
    pub fn open(&self, day: usize) -> Result<ArrayView1<'_, f64>, CoreError> {
        self.check_day(day)?;
        Ok(self.opens.row(day))
    }

    /// The closing prices for the half-open day range `days`, one row per day.
    pub fn closes(&self, days: Range<usize>) -> Result<ArrayView2<'_, f64>, CoreError> {
        if days.start > days.end || days.end > self.num_days() {
            return Err(CoreError::DayOutOfRange {
                day: days.end,
                num_days: self.num_days(),
            });
        }
        Ok(self.closes.slice(s![days.start..days.end, ..]))
    }

    /// The last `count` closing rows of the series (or all of them if shorter).
    pub fn tail_closes(&self, count: usize) -> ArrayView2<'_, f64> {
        let start = self.num_days().saturating_sub(count);
        self.closes.slice(s![start.., ..])
    }

    /// Realized close/open relatives for `day`.
    ///
    /// Assets without a usable open price get a relative of 1.0, so a weight held in
    /// them neither gains nor loses.
    pub fn price_relatives(&self, day: usize) -> Result<Array1<f64>, CoreError> {
        self.check_day(day)?;
        let opens = self.opens.row(day);
        let closes = self.closes.row(day);
        Ok(Array1::from_iter(opens.iter().zip(closes.iter()).map(
            |(&op, &cl)| {
                if op > 0.0 && op.is_finite() && cl.is_finite() {
                    silent_divide(cl, op)
                } else {
                    1.0
                }
            },
        )))
    }

    fn check_day(&self, day: usize) -> Result<(), CoreError> {
        if day >= self.num_days() {
            return Err(CoreError::DayOutOfRange {
                day,
                num_days: self.num_days(),
            });
        }
        Ok(())
    }
}

fn rows_to_matrix(name: &str, rows: &[Vec<f64>]) -> Result<Array2<f64>, CoreError> {
    let num_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != num_cols) {
        return Err(CoreError::InvalidInput(
            name.to_string(),
            "every day must list the same number of assets".to_string(),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), num_cols), flat)
        .map_err(|e| CoreError::InvalidInput(name.to_string(), e.to_string()))
}

/// Live market data plus an optional training period that ends right before the
/// first live day.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    live: PriceSeries,
    train: Option<PriceSeries>,
}

impl MarketData {
    pub fn new(live: PriceSeries, train: Option<PriceSeries>) -> Result<Self, CoreError> {
        if let Some(train) = &train {
            if train.num_assets() != live.num_assets() {
                return Err(CoreError::AssetCountMismatch {
                    live: live.num_assets(),
                    train: train.num_assets(),
                });
            }
            tracing::debug!(
                train_days = train.num_days(),
                live_days = live.num_days(),
                "Training series precedes the live series"
            );
        }
        Ok(Self { live, train })
    }

    /// Market data with no training period.
    pub fn live_only(live: PriceSeries) -> Self {
        Self { live, train: None }
    }

    pub fn live(&self) -> &PriceSeries {
        &self.live
    }

    pub fn train(&self) -> Option<&PriceSeries> {
        self.train.as_ref()
    }

    pub fn num_assets(&self) -> usize {
        self.live.num_assets()
    }

    pub fn num_days(&self) -> usize {
        self.live.num_days()
    }

    /// A copy of this data without the training period.
    pub fn without_training(&self) -> Self {
        Self::live_only(self.live.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_mismatched_shapes() {
        let err = PriceSeries::new(array![[1.0, 2.0]], array![[1.0, 2.0], [3.0, 4.0]]).unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_training_with_other_universe() {
        let live = PriceSeries::new(array![[1.0, 2.0]], array![[1.0, 2.0]]).unwrap();
        let train = PriceSeries::new(array![[1.0]], array![[1.0]]).unwrap();
        let err = MarketData::new(live, Some(train)).unwrap_err();
        assert_eq!(err, CoreError::AssetCountMismatch { live: 2, train: 1 });
    }

    #[test]
    fn frame_parses_from_json() {
        let frame: PriceFrame =
            serde_json::from_str(r#"{"opens": [[10, 20], [11, 21]], "closes": [[11, 19], [12, 22]]}"#)
                .unwrap();
        let series = PriceSeries::from_frame(&frame).unwrap();
        assert_eq!(series.num_days(), 2);
        assert_eq!(series.num_assets(), 2);
        assert_eq!(series.open(1).unwrap().to_vec(), vec![11.0, 21.0]);
    }

    #[test]
    fn ragged_frame_is_rejected() {
        let frame = PriceFrame {
            opens: vec![vec![1.0, 2.0], vec![1.0]],
            closes: vec![vec![1.0, 2.0], vec![1.0, 2.0]],
        };
        assert!(PriceSeries::from_frame(&frame).is_err());
    }

    #[test]
    fn price_relatives_treat_missing_opens_as_flat() {
        let series = PriceSeries::new(array![[10.0, 0.0]], array![[11.0, 5.0]]).unwrap();
        let rel = series.price_relatives(0).unwrap();
        assert!((rel[0] - 1.1).abs() < 1e-12);
        assert_eq!(rel[1], 1.0);
    }

    #[test]
    fn tail_closes_clamps_to_available_rows() {
        let series =
            PriceSeries::new(array![[1.0], [2.0]], array![[1.5], [2.5]]).unwrap();
        assert_eq!(series.tail_closes(5).nrows(), 2);
        assert_eq!(series.tail_closes(1)[[0, 0]], 2.5);
    }

    #[test]
    fn closes_out_of_range_is_an_error() {
        let series = PriceSeries::new(array![[1.0]], array![[1.0]]).unwrap();
        assert!(series.closes(0..2).is_err());
        assert_eq!(series.closes(0..0).unwrap().nrows(), 0);
    }
}
