use crate::canonical::{CanonicalProblem, VarMapping};
use crate::problem::Direction;

/// Optimum of a canonical problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSolution {
    /// Value of every canonical column
    pub values: Vec<f64>,
    /// Minimized canonical objective
    pub objective_value: f64,
    /// Basic variable of each row at the optimum
    pub basis: Vec<usize>,
    /// Pivots spent finding a feasible basis
    pub phase1_iterations: usize,
    /// Pivots spent optimizing from that basis
    pub phase2_iterations: usize,
}

impl CanonicalSolution {
    /// Largest `|A x - b|` over the rows of `problem`, NaN if any row is NaN.
    pub fn residual(&self, problem: &CanonicalProblem) -> f64 {
        problem
            .matrix
            .iter()
            .zip(&problem.rhs)
            .map(|(row, b)| {
                let lhs: f64 = row.iter().zip(&self.values).map(|(a, x)| a * x).sum();
                (lhs - b).abs()
            })
            .fold(0.0, |worst, r| if r.is_nan() || r > worst { r } else { worst })
    }

    /// Whether `A x = b` holds within `tolerance` and no value is below
    /// `-sign_tolerance`.
    pub fn is_feasible(&self, problem: &CanonicalProblem, tolerance: f64, sign_tolerance: f64) -> bool {
        self.residual(problem) <= tolerance && self.values.iter().all(|&x| x >= -sign_tolerance)
    }
}

/// Optimum of a general-form problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Value of every original variable
    pub values: Vec<f64>,
    /// Objective value in the original direction
    pub objective_value: f64,
    /// The canonical solution these were mapped from
    pub canonical: CanonicalSolution,
}

/// Recover original variable values from a canonical solution: split free
/// variables are recombined as `pos - neg`, the rest are copied.
pub fn map_to_original(canonical: &CanonicalProblem, solution: &[f64]) -> Vec<f64> {
    let value = |j: usize| solution.get(j).copied().unwrap_or(0.0);
    canonical
        .variables
        .iter()
        .map(|mapping| match *mapping {
            VarMapping::Single(j) => value(j),
            VarMapping::Split { pos, neg } => value(pos) - value(neg),
        })
        .collect()
}

/// Undo the negation applied to a `max` objective during canonicalization.
pub fn original_objective(direction: Direction, canonical_value: f64) -> f64 {
    match direction {
        Direction::Min => canonical_value,
        Direction::Max => -canonical_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use crate::problem::{ConstraintOp, GeneralProblem};

    #[test]
    fn test_map_recombines_free_variables() {
        let mut problem = GeneralProblem::new(Direction::Min, vec![1.0, 1.0, 1.0]);
        problem.add_constraint(vec![1.0, 2.0, -1.0], ConstraintOp::Le, 10.0);
        problem.set_non_negative([1]);
        let canonical = canonicalize(&problem);

        // x2 -> 0, x1 -> (1, 2), x3 -> (3, 4), s1 -> 5
        let values = vec![4.0, 0.0, 2.5, 1.5, 0.0, 2.5];
        let original = map_to_original(&canonical, &values);
        assert_eq!(original, vec![-2.5, 4.0, 1.5]);

        // the recombined values satisfy the original row
        let lhs: f64 = problem.constraints[0]
            .coefficients
            .iter()
            .zip(&original)
            .map(|(a, x)| a * x)
            .sum();
        let canonical_lhs: f64 = canonical.matrix[0].iter().zip(&values).map(|(a, x)| a * x).sum();
        assert!((lhs + values[5] - canonical_lhs).abs() < 1e-12);
    }

    #[test]
    fn test_original_objective() {
        assert_eq!(original_objective(Direction::Min, -3.0), -3.0);
        assert_eq!(original_objective(Direction::Max, -33.0), 33.0);
    }

    #[test]
    fn test_residual_and_feasibility() {
        let problem = CanonicalProblem::new(vec![1.0, 1.0], vec![vec![1.0, 1.0]], vec![2.0]);
        let solution = CanonicalSolution {
            values: vec![1.5, 0.5],
            objective_value: 2.0,
            basis: vec![0],
            phase1_iterations: 1,
            phase2_iterations: 0,
        };
        assert_eq!(solution.residual(&problem), 0.0);
        assert!(solution.is_feasible(&problem, 1e-6, 1e-9));

        let negative = CanonicalSolution {
            values: vec![2.5, -0.5],
            ..solution
        };
        assert!(!negative.is_feasible(&problem, 1e-6, 1e-9));

        let nan = CanonicalSolution {
            values: vec![f64::NAN, 0.5],
            ..negative
        };
        assert!(nan.residual(&problem).is_nan());
        assert!(!nan.is_feasible(&problem, 1e-6, 1e-9));
    }
}
