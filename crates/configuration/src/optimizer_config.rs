use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Represents a range of values for a single parameter to be tested.
///
/// Linear ranges are half-open: `end` itself is never produced.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterRange {
    DiscreteInt(Vec<i64>),
    DiscreteDecimal(Vec<Decimal>),
    LinearInt { start: i64, end: i64, step: i64 },
    LinearDecimal { start: Decimal, end: Decimal, step: Decimal },
}

impl ParameterRange {
    /// Expands the range into concrete integer values.
    pub fn int_values(&self, name: &str) -> Result<Vec<i64>, ConfigError> {
        match self {
            ParameterRange::DiscreteInt(vals) => Ok(vals.clone()),
            ParameterRange::LinearInt { start, end, step } => {
                if *step <= 0 {
                    return Err(ConfigError::ValidationError(format!(
                        "Step for '{}' must be positive.",
                        name
                    )));
                }
                Ok((*start..*end).step_by(*step as usize).collect())
            }
            ParameterRange::DiscreteDecimal(_) | ParameterRange::LinearDecimal { .. } => {
                Err(ConfigError::ValidationError(format!(
                    "'{}' must be an integer range.",
                    name
                )))
            }
        }
    }

    /// Expands the range into concrete decimal values. Integer ranges are widened.
    pub fn decimal_values(&self, name: &str) -> Result<Vec<Decimal>, ConfigError> {
        match self {
            ParameterRange::DiscreteDecimal(vals) => Ok(vals.clone()),
            ParameterRange::LinearDecimal { start, end, step } => {
                if step.is_sign_negative() || step.is_zero() {
                    return Err(ConfigError::ValidationError(format!(
                        "Step for '{}' must be positive.",
                        name
                    )));
                }
                let mut vals = Vec::new();
                let mut current = *start;
                while current < *end {
                    vals.push(current);
                    current += *step;
                }
                Ok(vals)
            }
            ParameterRange::DiscreteInt(_) | ParameterRange::LinearInt { .. } => Ok(self
                .int_values(name)?
                .into_iter()
                .map(Decimal::from)
                .collect()),
        }
    }
}
