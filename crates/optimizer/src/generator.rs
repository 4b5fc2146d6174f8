use crate::error::OptimizerError;
use itertools::Itertools;
use strategies::{HyperparamGrid, OlmarHyperparams};

/// Generates every `(window, eps)` combination of the grid.
///
/// The order is window-major: all epsilons for the first window, then all epsilons for
/// the second, and so on. Ties in the tuner are broken by this order.
pub fn generate_parameter_sets(
    grid: &HyperparamGrid,
) -> Result<Vec<OlmarHyperparams>, OptimizerError> {
    let combinations: Vec<OlmarHyperparams> = grid
        .windows()
        .iter()
        .cartesian_product(grid.epsilons().iter())
        .map(|(&window, &eps)| OlmarHyperparams::new(window, eps))
        .collect::<Result<_, _>>()?;

    if combinations.is_empty() {
        return Err(OptimizerError::ParameterGeneration(
            "the hyperparameter grid is empty".to_string(),
        ));
    }
    Ok(combinations)
}
