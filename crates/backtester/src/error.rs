use thiserror::Error;

/// Error type returned by a `Retuner`.
pub type TuneFailure = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Market data error: {0}")]
    Data(#[from] core_types::CoreError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Hyperparameter tuning failed on day {day}: {source}")]
    Tuning {
        day: usize,
        #[source]
        source: TuneFailure,
    },

    #[error("Invalid simulation range {start}..{stop} for {num_days} days of data")]
    InvalidRange {
        start: usize,
        stop: usize,
        num_days: usize,
    },

    #[error("Invalid simulation parameters: {0}")]
    InvalidParameters(String),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
