use std::fmt;

use crate::canonical::CanonicalProblem;
use crate::error::SolveError;

/// Which objective a tableau is currently optimizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Minimizing the sum of artificial variables
    Auxiliary,
    /// Minimizing the canonical objective
    Primal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Auxiliary => f.write_str("phase 1"),
            Phase::Primal => f.write_str("phase 2"),
        }
    }
}

/// Position of a pivot cell in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    /// Row of the leaving basic variable
    pub row: usize,
    /// Table column of the entering non-basic variable
    pub col: usize,
}

/// Canonical column indices swapped by one pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub entering: usize,
    pub leaving: usize,
}

/// Short simplex tableau.
///
/// Only non-basic columns are stored: `data` has one row per constraint plus
/// a final row of reduced costs, and one column per non-basic variable plus a
/// final column of basic values. The corner cell holds the negated objective
/// value. Basic columns form an implicit identity and are never stored.
#[derive(Debug, Clone)]
pub struct Tableau {
    phase: Phase,
    costs: Vec<f64>,
    var_names: Vec<String>,
    basis: Vec<usize>,
    free: Vec<usize>,
    data: Vec<Vec<f64>>,
}

impl Tableau {
    /// Build a phase-2 tableau from a basis whose columns already form an
    /// identity in `problem.matrix`.
    pub fn build(problem: &CanonicalProblem, basis: Vec<usize>) -> Result<Self, SolveError> {
        Self::build_in_phase(problem, basis, Phase::Primal)
    }

    pub(crate) fn build_in_phase(
        problem: &CanonicalProblem,
        basis: Vec<usize>,
        phase: Phase,
    ) -> Result<Self, SolveError> {
        let m = problem.num_rows();
        let n = problem.num_columns();

        if basis.len() != m {
            return Err(SolveError::Dimension {
                expected: m,
                actual: basis.len(),
            });
        }

        let mut is_basic = vec![false; n];
        for &index in &basis {
            if index >= n || is_basic[index] {
                return Err(SolveError::InvalidBasis { index });
            }
            is_basic[index] = true;
        }

        let free: Vec<usize> = (0..n).filter(|&j| !is_basic[j]).collect();

        let mut data = vec![vec![0.0; free.len() + 1]; m + 1];
        for (i, line) in data.iter_mut().take(m).enumerate() {
            for (j, &col) in free.iter().enumerate() {
                line[j] = problem.matrix[i][col];
            }
            line[free.len()] = problem.rhs[i];
        }

        let mut tableau = Self {
            phase,
            costs: problem.objective.clone(),
            var_names: problem.var_names.clone(),
            basis,
            free,
            data,
        };
        tableau.recompute_reduced_costs();
        Ok(tableau)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Canonical index of the basic variable in each row
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// Canonical index of the non-basic variable in each table column
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    pub fn num_rows(&self) -> usize {
        self.basis.len()
    }

    pub fn var_name(&self, index: usize) -> &str {
        self.var_names.get(index).map(String::as_str).unwrap_or("?")
    }

    /// Reduced cost of every non-basic column
    pub fn reduced_costs(&self) -> &[f64] {
        let m = self.basis.len();
        &self.data[m][..self.free.len()]
    }

    /// Current value of each basic variable, by row
    pub fn basic_values(&self) -> impl Iterator<Item = f64> + '_ {
        let rhs = self.free.len();
        self.data.iter().take(self.basis.len()).map(move |line| line[rhs])
    }

    pub fn objective_value(&self) -> f64 {
        let m = self.basis.len();
        -self.data[m][self.free.len()]
    }

    /// `delta_j = c_j - sum_i c_basis(i) * a_ij` over every non-basic column
    /// and the right-hand side.
    fn recompute_reduced_costs(&mut self) {
        let m = self.basis.len();
        let width = self.free.len() + 1;

        for j in 0..width {
            let mut delta = if j < self.free.len() {
                self.costs[self.free[j]]
            } else {
                0.0
            };
            for i in 0..m {
                delta -= self.costs[self.basis[i]] * self.data[i][j];
            }
            self.data[m][j] = delta;
        }
    }

    /// Choose the next pivot.
    ///
    /// Enters the column with the most negative reduced cost and leaves the
    /// row with the smallest ratio `rhs / a` over entries above `tolerance`.
    /// Ties go to the lowest column and the lowest row. Returns `Ok(None)`
    /// when every reduced cost is at least `-tolerance`.
    pub fn find_pivot(&self, tolerance: f64) -> Result<Option<Pivot>, SolveError> {
        let m = self.basis.len();
        let rhs = self.free.len();

        let mut col = None;
        let mut most_negative = -tolerance;
        for (j, &delta) in self.reduced_costs().iter().enumerate() {
            if delta < most_negative {
                most_negative = delta;
                col = Some(j);
            }
        }
        let Some(col) = col else {
            return Ok(None);
        };

        let mut row = None;
        let mut min_ratio = f64::INFINITY;
        for i in 0..m {
            let a = self.data[i][col];
            if a > tolerance {
                let ratio = self.data[i][rhs] / a;
                if row.is_none() || ratio < min_ratio {
                    min_ratio = ratio;
                    row = Some(i);
                }
            }
        }

        match row {
            Some(row) => Ok(Some(Pivot { row, col })),
            None => Err(SolveError::Unbounded {
                variable: self.var_name(self.free[col]).to_string(),
            }),
        }
    }

    /// Gauss-Jordan step on the pivot cell, reduced-cost row included, then
    /// swap the entering and leaving variables between basis and non-basis.
    pub fn pivot(&mut self, pivot: Pivot) -> Exchange {
        let Pivot { row, col } = pivot;
        let old_pivot = self.data[row][col];
        let old_row = self.data[row].clone();
        let old_col: Vec<f64> = self.data.iter().map(|line| line[col]).collect();

        for (i, line) in self.data.iter_mut().enumerate() {
            for (j, cell) in line.iter_mut().enumerate() {
                *cell = match (i == row, j == col) {
                    (true, true) => 1.0 / old_pivot,
                    (true, false) => old_row[j] / old_pivot,
                    (false, true) => -old_col[i] / old_pivot,
                    (false, false) => *cell - (old_row[j] * old_col[i]) / old_pivot,
                };
            }
        }

        let leaving = self.basis[row];
        let entering = self.free[col];
        self.basis[row] = entering;
        self.free[col] = leaving;

        Exchange { entering, leaving }
    }

    /// Substitute the objective and recompute the reduced-cost row for the
    /// current basis.
    pub fn replace_objective(&mut self, costs: Vec<f64>, var_names: Vec<String>) -> Result<(), SolveError> {
        if var_names.len() != costs.len() {
            return Err(SolveError::Dimension {
                expected: costs.len(),
                actual: var_names.len(),
            });
        }
        if let Some(&index) = self.basis.iter().chain(&self.free).find(|&&j| j >= costs.len()) {
            return Err(SolveError::InvalidBasis { index });
        }

        self.costs = costs;
        self.var_names = var_names;
        self.recompute_reduced_costs();
        Ok(())
    }

    /// Hand an auxiliary tableau over to the original objective, keeping the
    /// basis found so far.
    pub fn promote_to_original_objective(&mut self, problem: &CanonicalProblem) -> Result<(), SolveError> {
        self.replace_objective(problem.objective.clone(), problem.var_names.clone())?;
        self.phase = Phase::Primal;
        Ok(())
    }

    /// Drop every non-basic column whose canonical index is `n_original` or
    /// above. Returns how many columns were removed.
    pub fn remove_auxiliary_columns(&mut self, n_original: usize) -> usize {
        let doomed: Vec<usize> = self
            .free
            .iter()
            .enumerate()
            .filter(|&(_, &index)| index >= n_original)
            .map(|(j, _)| j)
            .collect();

        for &j in doomed.iter().rev() {
            for line in &mut self.data {
                line.remove(j);
            }
            self.free.remove(j);
        }
        doomed.len()
    }

    /// Basic variables take their right-hand side, everything else is zero.
    pub fn solution(&self) -> (Vec<f64>, f64) {
        let mut values = vec![0.0; self.costs.len()];
        for (&index, value) in self.basis.iter().zip(self.basic_values()) {
            values[index] = value;
        }
        (values, self.objective_value())
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let basis: Vec<&str> = self.basis.iter().map(|&j| self.var_name(j)).collect();
        let free: Vec<&str> = self.free.iter().map(|&j| self.var_name(j)).collect();
        writeln!(f, "Basis: [{}]", basis.join(", "))?;
        writeln!(f, "Non-basic: [{}]", free.join(", "))?;
        writeln!(f)?;

        write!(f, "     ")?;
        for name in &free {
            write!(f, "{:>8} ", name)?;
        }
        writeln!(f, "{:>8}", "b")?;

        for (name, line) in basis.iter().zip(&self.data) {
            write!(f, "{:>4} |", name)?;
            for cell in line {
                write!(f, "{:8.3} ", cell)?;
            }
            writeln!(f)?;
        }

        write!(f, "{:>4} |", "W")?;
        for cell in &self.data[self.basis.len()] {
            write!(f, "{:8.3} ", cell)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // max 3x1 + 2x2 in canonical form, slacks s1..s3 in columns 2..4
    fn classic() -> CanonicalProblem {
        let mut problem = CanonicalProblem::new(
            vec![-3.0, -2.0, 0.0, 0.0, 0.0],
            vec![
                vec![2.0, 1.0, 1.0, 0.0, 0.0],
                vec![2.0, 3.0, 0.0, 1.0, 0.0],
                vec![3.0, 1.0, 0.0, 0.0, 1.0],
            ],
            vec![18.0, 42.0, 24.0],
        );
        problem.var_names = ["x1", "x2", "s1", "s2", "s3"].map(String::from).to_vec();
        problem
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_build_rejects_wrong_basis_size() {
        let err = Tableau::build(&classic(), vec![2, 3]).unwrap_err();
        assert_eq!(err, SolveError::Dimension { expected: 3, actual: 2 });
    }

    #[test]
    fn test_build_rejects_repeated_basis() {
        let err = Tableau::build(&classic(), vec![2, 3, 3]).unwrap_err();
        assert_eq!(err, SolveError::InvalidBasis { index: 3 });
        let err = Tableau::build(&classic(), vec![2, 3, 9]).unwrap_err();
        assert_eq!(err, SolveError::InvalidBasis { index: 9 });
    }

    #[test]
    fn test_build_slack_basis() {
        let tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        assert_eq!(tableau.phase(), Phase::Primal);
        assert_eq!(tableau.free(), &[0, 1]);
        assert_eq!(tableau.reduced_costs(), &[-3.0, -2.0]);
        assert_eq!(tableau.objective_value(), 0.0);
        assert_eq!(tableau.basic_values().collect::<Vec<_>>(), vec![18.0, 42.0, 24.0]);
    }

    #[test]
    fn test_find_pivot_most_negative_and_min_ratio() {
        let tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        // ratios 9, 21, 8
        assert_eq!(tableau.find_pivot(1e-10).unwrap(), Some(Pivot { row: 2, col: 0 }));
    }

    #[test]
    fn test_find_pivot_ties_go_low() {
        let problem = CanonicalProblem::new(
            vec![-1.0, -1.0, 0.0, 0.0],
            vec![vec![1.0, 1.0, 1.0, 0.0], vec![2.0, 0.0, 0.0, 1.0]],
            vec![4.0, 8.0],
        );
        let tableau = Tableau::build(&problem, vec![2, 3]).unwrap();
        assert_eq!(tableau.find_pivot(1e-10).unwrap(), Some(Pivot { row: 0, col: 0 }));
    }

    #[test]
    fn test_find_pivot_reports_unbounded() {
        let problem = CanonicalProblem::new(vec![0.0, -1.0], vec![vec![1.0, -1.0]], vec![1.0]);
        let tableau = Tableau::build(&problem, vec![0]).unwrap();
        assert_eq!(
            tableau.find_pivot(1e-10).unwrap_err(),
            SolveError::Unbounded {
                variable: "x2".to_string()
            }
        );
    }

    #[test]
    fn test_find_pivot_optimal_within_tolerance() {
        let problem = CanonicalProblem::new(vec![0.0, -1e-12], vec![vec![1.0, 1.0]], vec![1.0]);
        let tableau = Tableau::build(&problem, vec![0]).unwrap();
        assert_eq!(tableau.find_pivot(1e-10).unwrap(), None);
        assert_eq!(tableau.find_pivot(1e-13).unwrap(), Some(Pivot { row: 0, col: 0 }));
    }

    #[test]
    fn test_pivot_keeps_reduced_costs_exact() {
        let mut tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        let problem = classic();

        while let Some(pivot) = tableau.find_pivot(1e-10).unwrap() {
            tableau.pivot(pivot);

            let mut fresh = tableau.clone();
            fresh
                .replace_objective(problem.objective.clone(), problem.var_names.clone())
                .unwrap();
            for (a, b) in tableau.reduced_costs().iter().zip(fresh.reduced_costs()) {
                assert_close(*a, *b);
            }
            assert_close(tableau.objective_value(), fresh.objective_value());
        }

        let (values, objective) = tableau.solution();
        assert_close(objective, -33.0);
        assert_close(values[0], 3.0);
        assert_close(values[1], 12.0);
    }

    #[test]
    fn test_pivot_swaps_indices() {
        let mut tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        let exchange = tableau.pivot(Pivot { row: 2, col: 0 });
        assert_eq!(exchange, Exchange { entering: 0, leaving: 4 });
        assert_eq!(tableau.basis(), &[2, 3, 0]);
        assert_eq!(tableau.free(), &[4, 1]);
        // x1 = 24 / 3
        assert_close(tableau.basic_values().nth(2).unwrap(), 8.0);
        assert_close(tableau.objective_value(), -24.0);
    }

    #[test]
    fn test_remove_auxiliary_columns() {
        let mut tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        tableau.pivot(Pivot { row: 0, col: 0 });
        tableau.pivot(Pivot { row: 1, col: 1 });
        assert_eq!(tableau.free(), &[2, 3]);

        assert_eq!(tableau.remove_auxiliary_columns(3), 1);
        assert_eq!(tableau.free(), &[2]);
        assert_eq!(tableau.reduced_costs().len(), 1);
        assert_eq!(tableau.remove_auxiliary_columns(3), 0);
    }

    #[test]
    fn test_replace_objective_checks_columns() {
        let mut tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        let err = tableau
            .replace_objective(vec![1.0, 1.0], vec!["a".into(), "b".into()])
            .unwrap_err();
        assert_eq!(err, SolveError::InvalidBasis { index: 2 });
        let err = tableau.replace_objective(vec![1.0; 5], vec!["a".into()]).unwrap_err();
        assert_eq!(err, SolveError::Dimension { expected: 5, actual: 1 });
    }

    #[test]
    fn test_display() {
        let tableau = Tableau::build(&classic(), vec![2, 3, 4]).unwrap();
        let text = tableau.to_string();
        assert!(text.starts_with("Basis: [s1, s2, s3]\nNon-basic: [x1, x2]\n"));
        assert!(text.contains("   W |  -3.000   -2.000    0.000"));
    }
}
