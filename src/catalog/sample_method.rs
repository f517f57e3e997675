//! Row sampling methods assigned to relations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of the Bernoulli sampling parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SampleUnits {
    /// Percentage chance (0-100) that each row is kept
    #[default]
    Probability,
    /// Fixed number of rows
    Rows,
}

/// How rows are drawn from a relation when it is sampled independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    /// Row-level Bernoulli sampling
    Bernoulli {
        value: f64,
        #[serde(default)]
        units: SampleUnits,
    },
}

impl SampleMethod {
    pub fn bernoulli_probability(probability: f64) -> Self {
        SampleMethod::Bernoulli {
            value: probability,
            units: SampleUnits::Probability,
        }
    }

    pub fn bernoulli_rows(rows: u64) -> Self {
        SampleMethod::Bernoulli {
            value: rows as f64,
            units: SampleUnits::Rows,
        }
    }

    /// Checks the parameter is usable for its units
    pub fn validate(&self) -> Result<(), String> {
        match self {
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Probability,
            } => {
                if !(*value > 0.0 && *value <= 100.0) {
                    return Err(format!(
                        "bernoulli probability must be in (0, 100], got {}",
                        value
                    ));
                }
            }
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Rows,
            } => {
                if *value < 1.0 || value.fract() != 0.0 {
                    return Err(format!(
                        "bernoulli row count must be a positive integer, got {}",
                        value
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for SampleMethod {
    fn default() -> Self {
        SampleMethod::bernoulli_probability(10.0)
    }
}

impl fmt::Display for SampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Probability,
            } => write!(f, "bernoulli({}%)", value),
            SampleMethod::Bernoulli {
                value,
                units: SampleUnits::Rows,
            } => write!(f, "bernoulli({} rows)", value),
        }
    }
}
