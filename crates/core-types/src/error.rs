use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Price matrices have mismatched shapes: opens {opens:?}, closes {closes:?}")]
    ShapeMismatch {
        opens: (usize, usize),
        closes: (usize, usize),
    },

    #[error("Training series has {train} assets but the live series has {live}")]
    AssetCountMismatch { live: usize, train: usize },

    #[error("Day {day} is out of range for a series of {num_days} days")]
    DayOutOfRange { day: usize, num_days: usize },

    #[error("Calculation error: {0}")]
    Calculation(String),
}
