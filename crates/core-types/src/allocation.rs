//! Helpers shared by every allocation rule: availability masking, guarded division,
//! uniform allocation and 1-norm normalisation.

use crate::error::CoreError;
use ndarray::{Array1, ArrayView1};

/// Divides `numerator` by `denominator`, returning 0.0 instead of a non-finite value.
pub fn silent_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() { quotient } else { 0.0 }
}

/// An asset is available on a day when its opening price is positive and finite.
pub fn availability_mask(opens: ArrayView1<'_, f64>) -> Vec<bool> {
    opens.iter().map(|&op| op > 0.0 && op.is_finite()).collect()
}

/// Indices of the `true` entries of an availability mask.
pub fn available_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &avail)| avail.then_some(i))
        .collect()
}

/// Equal weight across the available assets, zero for the rest.
pub fn uniform_allocation(
    num_assets: usize,
    opens: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, CoreError> {
    if opens.len() != num_assets {
        return Err(CoreError::InvalidInput(
            "opens".to_string(),
            format!("expected {} assets, got {}", num_assets, opens.len()),
        ));
    }
    let mask = availability_mask(opens);
    let num_avail = mask.iter().filter(|&&avail| avail).count();
    if num_avail == 0 {
        return Err(CoreError::Calculation(
            "no asset has a usable opening price".to_string(),
        ));
    }
    let weight = 1.0 / num_avail as f64;
    Ok(mask
        .iter()
        .map(|&avail| if avail { weight } else { 0.0 })
        .collect())
}

/// Scales `weights` so that its 1-norm is one. Negative weights are kept.
pub fn normalize_l1(weights: &Array1<f64>) -> Result<Array1<f64>, CoreError> {
    let norm: f64 = weights.iter().map(|w| w.abs()).sum();
    if norm == 0.0 || !norm.is_finite() {
        return Err(CoreError::Calculation(format!(
            "cannot normalise a vector with 1-norm {}",
            norm
        )));
    }
    Ok(weights / norm)
}
