use std::collections::BTreeSet;
use std::fmt;

use crate::error::ProblemError;

/// A linear program in general form
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralProblem {
    /// Whether to minimize or maximize
    pub direction: Direction,
    /// Objective coefficients, one per original variable
    pub objective: Vec<f64>,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Zero-based indices of variables restricted to be non-negative.
    /// Every other variable is free in sign.
    pub non_negative: BTreeSet<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Min,
    Max,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Min => f.write_str("min"),
            Direction::Max => f.write_str("max"),
        }
    }
}

impl GeneralProblem {
    pub fn new(direction: Direction, objective: Vec<f64>) -> Self {
        Self {
            direction,
            objective,
            constraints: Vec::new(),
            non_negative: BTreeSet::new(),
        }
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            coefficients,
            op,
            rhs,
        });
    }

    pub fn set_non_negative(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.non_negative = indices.into_iter().collect();
    }

    pub fn is_non_negative(&self, index: usize) -> bool {
        self.non_negative.contains(&index)
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check that every constraint has one coefficient per variable, that
    /// all numbers are finite and that the sign restrictions refer to
    /// existing variables.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ProblemError::NoVariables);
        }
        if let Some(j) = self.objective.iter().position(|v| !v.is_finite()) {
            return Err(ProblemError::NonFinite {
                location: format!("objective coefficient {}", j + 1),
            });
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n {
                return Err(ProblemError::CoefficientCount {
                    constraint: i + 1,
                    expected: n,
                    actual: c.coefficients.len(),
                });
            }
            if let Some(j) = c.coefficients.iter().position(|v| !v.is_finite()) {
                return Err(ProblemError::NonFinite {
                    location: format!("constraint {} coefficient {}", i + 1, j + 1),
                });
            }
            if !c.rhs.is_finite() {
                return Err(ProblemError::NonFinite {
                    location: format!("constraint {} right-hand side", i + 1),
                });
            }
        }
        if let Some(&index) = self.non_negative.iter().find(|&&i| i >= n) {
            return Err(ProblemError::VariableIndex { index, count: n });
        }
        Ok(())
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, coefficients: &[f64]) -> fmt::Result {
    for (j, coef) in coefficients.iter().enumerate() {
        if j > 0 {
            f.write_str(" + ")?;
        }
        write!(f, "{}*x{}", coef, j + 1)?;
    }
    Ok(())
}

impl fmt::Display for GeneralProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Objective: {} ", self.direction)?;
        write_terms(f, &self.objective)?;
        writeln!(f)?;
        writeln!(f, "Constraints:")?;
        for c in &self.constraints {
            write_terms(f, &c.coefficients)?;
            writeln!(f, " {} {}", c.op.symbol(), c.rhs)?;
        }
        if self.non_negative.is_empty() {
            writeln!(f, "All variables are free in sign")
        } else {
            let names: Vec<String> = self.non_negative.iter().map(|i| format!("x{}", i + 1)).collect();
            writeln!(f, "Non-negative variables: {}", names.join(", "))
        }
    }
}
