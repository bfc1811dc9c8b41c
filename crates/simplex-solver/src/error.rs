use std::fmt;

use thiserror::Error;

/// Which pass of the two-phase method was running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Driving the artificial variables to zero
    One,
    /// Optimizing the real objective
    Two,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::One => f.write_str("phase 1"),
            Stage::Two => f.write_str("phase 2"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("The LP is unbounded and cannot be solved (detected in {stage})")]
    Unbounded { stage: Stage },
    #[error("The LP is infeasible: phase 1 ended with artificial sum {residual}")]
    Infeasible { residual: f64 },
    /// Defect report: phase 1 finished with an artificial variable still basic
    #[error("Artificial variable {variable} is a basic variable after phase 1 completed")]
    ArtificialInBasis { variable: String },
    #[error("No optimum reached within {limit} pivots")]
    IterationLimit { limit: usize },
}
