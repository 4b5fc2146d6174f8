use crate::error::StrategyError;
use core_types::MarketData;
use ndarray::{Array1, Array2, Axis, concatenate};

/// The trailing closes used to estimate the moving average, plus today's open.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    /// Number of close rows actually available.
    pub effective_window: usize,
    /// One row per trailing day, oldest first.
    pub closes: Array2<f64>,
    pub today_open: Array1<f64>,
}

/// Assembles the `window` closes before live `day` together with the open of `day`.
///
/// When the window reaches back past the first live day and a training period exists,
/// the missing rows come from the tail of the training closes. Without a training
/// period the window shrinks to the `day` rows that exist, so day 0 yields no closes.
pub fn extract_window(
    data: &MarketData,
    day: usize,
    window: usize,
) -> Result<PriceWindow, StrategyError> {
    let live = data.live();
    let today_open = live.open(day)?.to_owned();

    let closes = match data.train() {
        Some(train) if day < window => {
            let past = train.tail_closes(window - day);
            if day == 0 {
                past.to_owned()
            } else {
                let current = live.closes(0..day)?;
                concatenate(Axis(0), &[past, current]).map_err(|e| {
                    StrategyError::InvalidParameters(format!(
                        "training and live closes cannot be joined: {}",
                        e
                    ))
                })?
            }
        }
        _ => {
            let effective = window.min(day);
            live.closes(day - effective..day)?.to_owned()
        }
    };

    Ok(PriceWindow {
        effective_window: closes.nrows(),
        closes,
        today_open,
    })
}
