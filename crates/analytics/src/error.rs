use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Wealth series contains a non-finite value at index {0}")]
    NonFiniteWealth(usize),
}
