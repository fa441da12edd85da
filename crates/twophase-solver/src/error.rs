use std::fmt;

use thiserror::Error;

use crate::tableau::Phase;

/// Any failure of [`Solver::solve`](crate::Solver::solve).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Errors raised while solving a canonical problem.
///
/// None of these are recovered internally: each one aborts the solve at the
/// point of detection and no partial solution is returned with it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The basis does not have one variable per row, or a replacement
    /// objective does not match the tableau's columns.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
    #[error("invalid basis: column {index} is out of range or repeated")]
    InvalidBasis { index: usize },
    #[error("problem has no feasible solution ({0})")]
    Infeasible(Infeasibility),
    #[error("objective is unbounded (entering variable {variable})")]
    Unbounded { variable: String },
    #[error("{phase} did not converge within {limit} iterations")]
    IterationLimitExceeded { phase: Phase, limit: usize },
    /// The final basis does not reproduce `A x = b, x >= 0` within tolerance.
    #[error("solution violates the constraints (residual {residual:e})")]
    Inaccurate { residual: f64 },
}

/// Why phase 1 rejected the problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Infeasibility {
    /// The auxiliary objective stayed away from zero.
    AuxiliaryObjective(f64),
    /// An artificial variable is still basic at the end of phase 1.
    ArtificialInBasis(String),
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::AuxiliaryObjective(value) => {
                write!(f, "auxiliary objective W = {:.6}", value)
            }
            Infeasibility::ArtificialInBasis(name) => {
                write!(f, "artificial variable {} remains in the basis", name)
            }
        }
    }
}

/// Structural problems with a general-form problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("problem has no variables")]
    NoVariables,
    #[error("constraint {constraint} has {actual} coefficients, expected {expected}")]
    CoefficientCount {
        constraint: usize,
        expected: usize,
        actual: usize,
    },
    #[error("non-negative variable index {index} is out of range for {count} variables")]
    VariableIndex { index: usize, count: usize },
    #[error("{location} is not a finite number")]
    NonFinite { location: String },
}
