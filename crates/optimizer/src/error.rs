use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Trial (window {window}, eps {eps}) failed: {source}")]
    Trial {
        window: usize,
        eps: f64,
        #[source]
        source: backtester::BacktestError,
    },

    #[error("Strategy error during parameter generation: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("No allocation was recorded for day {0}, the start of the tuning period")]
    MissingAllocation(usize),

    #[error("Parameter generation failed: {0}")]
    ParameterGeneration(String),
}
