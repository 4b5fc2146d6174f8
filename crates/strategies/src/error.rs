use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Allocation is undefined on day {day}: {reason}")]
    DegenerateAllocation { day: usize, reason: String },

    #[error("Market data error: {0}")]
    Data(#[from] CoreError),
}
