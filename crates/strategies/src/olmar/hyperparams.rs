use crate::error::StrategyError;
use configuration::OlmarParams;
use serde::{Deserialize, Serialize};

/// A validated `(window, eps)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlmarHyperparams {
    window: usize,
    eps: f64,
}

impl OlmarHyperparams {
    /// Fails if `eps <= 1` or `window < 1`.
    pub fn new(window: usize, eps: f64) -> Result<Self, StrategyError> {
        if !(eps > 1.0) || !eps.is_finite() {
            return Err(StrategyError::InvalidParameters(format!(
                "Epsilon must be > 1, got {}",
                eps
            )));
        }
        if window < 1 {
            return Err(StrategyError::InvalidParameters(
                "Window length must be at least 1, and it is recommended that the window be >= 3"
                    .to_string(),
            ));
        }
        Ok(Self { window, eps })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }
}

/// The ordered candidate values the tuner searches over. Fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparamGrid {
    windows: Vec<usize>,
    epsilons: Vec<f64>,
}

impl HyperparamGrid {
    pub fn new(windows: Vec<usize>, epsilons: Vec<f64>) -> Result<Self, StrategyError> {
        if windows.is_empty() || epsilons.is_empty() {
            return Err(StrategyError::InvalidParameters(
                "hyperparameter grid needs at least one window and one epsilon".to_string(),
            ));
        }
        // Every candidate must itself be a valid pair.
        for &window in &windows {
            for &eps in &epsilons {
                OlmarHyperparams::new(window, eps)?;
            }
        }
        Ok(Self { windows, epsilons })
    }

    pub fn from_config(params: &OlmarParams) -> Result<Self, StrategyError> {
        let windows = params
            .window_candidates()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        let epsilons = params
            .eps_candidates()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;
        Self::new(windows, epsilons)
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn epsilons(&self) -> &[f64] {
        &self.epsilons
    }

    pub fn len(&self) -> usize {
        self.windows.len() * self.epsilons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only record of every adopted value, seeded with the initial one.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparamHistory {
    windows: Vec<usize>,
    epsilons: Vec<f64>,
}

impl HyperparamHistory {
    pub fn new(initial: OlmarHyperparams) -> Self {
        Self {
            windows: vec![initial.window],
            epsilons: vec![initial.eps],
        }
    }

    pub fn push(&mut self, params: OlmarHyperparams) {
        self.windows.push(params.window);
        self.epsilons.push(params.eps);
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn epsilons(&self) -> &[f64] {
        &self.epsilons
    }
}

/// On-disk form of the hyperparameters of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparamsRecord {
    #[serde(rename = "Window")]
    pub window: String,
    #[serde(rename = "Epsilon")]
    pub epsilon: String,
}

impl From<OlmarHyperparams> for HyperparamsRecord {
    fn from(params: OlmarHyperparams) -> Self {
        Self {
            window: params.window.to_string(),
            epsilon: params.eps.to_string(),
        }
    }
}

impl TryFrom<&HyperparamsRecord> for OlmarHyperparams {
    type Error = StrategyError;

    fn try_from(record: &HyperparamsRecord) -> Result<Self, Self::Error> {
        let window = record.window.trim().parse::<usize>().map_err(|e| {
            StrategyError::InvalidParameters(format!("Window '{}': {}", record.window, e))
        })?;
        let eps = record.epsilon.trim().parse::<f64>().map_err(|e| {
            StrategyError::InvalidParameters(format!("Epsilon '{}': {}", record.epsilon, e))
        })?;
        OlmarHyperparams::new(window, eps)
    }
}
