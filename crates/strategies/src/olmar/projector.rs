use crate::error::StrategyError;
use core_types::{available_indices, normalize_l1};
use ndarray::Array1;

/// Upper bound on the step size. Near-zero dispersion would otherwise produce an
/// arbitrarily large, numerically unstable move.
pub const MAX_LAMBDA: f64 = 100_000.0;

/// Result of one passive-aggressive update.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// New allocation, 1-norm one.
    pub allocation: Array1<f64>,
    pub lambda: f64,
    pub mean_ppr: f64,
}

/// Passive-aggressive step size.
///
/// `lambda = max(0, (eps - b . x) / ||x - mean(x)||^2)`, capped at `MAX_LAMBDA`, where
/// `x` are the predicted relatives of the available assets and `b` their current
/// weights. Zero dispersion gives `lambda = 0`.
pub fn compute_lambda(ppr_avail: &Array1<f64>, mean_ppr: f64, avail_b: &Array1<f64>, eps: f64) -> f64 {
    let l2_norm = ppr_avail
        .iter()
        .map(|p| (p - mean_ppr) * (p - mean_ppr))
        .sum::<f64>()
        .sqrt();

    if l2_norm == 0.0 {
        return 0.0;
    }

    let predicted_under_eps = eps - avail_b.dot(ppr_avail);
    let lambda = predicted_under_eps / l2_norm.powi(2);
    // `f64::max` drops a NaN operand, so a NaN step collapses to 0.
    lambda.max(0.0).min(MAX_LAMBDA)
}

/// Moves `b` towards the predicted relatives and renormalises to unit 1-norm.
///
/// Only assets with a strictly positive predicted relative receive a weight in the
/// unnormalised vector; every other entry is zero rather than its previous weight.
/// No simplex projection is applied, so short positions survive.
pub fn project_allocation(
    day: usize,
    ppr: &Array1<f64>,
    b: &Array1<f64>,
    available: &[bool],
    eps: f64,
) -> Result<Projection, StrategyError> {
    if ppr.len() != b.len() || available.len() != b.len() {
        return Err(StrategyError::InvalidParameters(format!(
            "allocation has {} assets but {} predictions and {} availability flags",
            b.len(),
            ppr.len(),
            available.len()
        )));
    }

    let avail_idxs = available_indices(available);
    if avail_idxs.is_empty() {
        return Err(StrategyError::DegenerateAllocation {
            day,
            reason: "no asset has a usable opening price".to_string(),
        });
    }

    let ppr_avail: Array1<f64> = avail_idxs.iter().map(|&i| ppr[i]).collect();
    let avail_b: Array1<f64> = avail_idxs.iter().map(|&i| b[i]).collect();
    let mean_ppr = ppr_avail.sum() / ppr_avail.len() as f64;

    let lambda = compute_lambda(&ppr_avail, mean_ppr, &avail_b, eps);

    let new_b: Array1<f64> = ppr
        .iter()
        .zip(b.iter())
        .map(|(&x, &w)| if x > 0.0 { w + lambda * (x - mean_ppr) } else { 0.0 })
        .collect();

    let allocation = normalize_l1(&new_b).map_err(|e| StrategyError::DegenerateAllocation {
        day,
        reason: e.to_string(),
    })?;

    Ok(Projection {
        allocation,
        lambda,
        mean_ppr,
    })
}
