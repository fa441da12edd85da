use std::collections::BTreeMap;
use std::fmt;

use crate::problem::{ConstraintOp, Direction, GeneralProblem};

/// A linear program in canonical form: `min c'x, Ax = b, x >= 0, b >= 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalProblem {
    /// Minimization objective, one coefficient per canonical column
    pub objective: Vec<f64>,
    /// Constraint matrix, `m` rows of `N` columns
    pub matrix: Vec<Vec<f64>>,
    /// Right-hand sides, all non-negative
    pub rhs: Vec<f64>,
    /// Display name of every canonical column
    pub var_names: Vec<String>,
    /// Original free variable index -> (positive part, negative part) columns
    pub free_splits: BTreeMap<usize, (usize, usize)>,
    /// Canonical column(s) of every original variable, by original index
    pub variables: Vec<VarMapping>,
    /// Direction of the general problem this was derived from
    pub direction: Direction,
}

/// Where an original variable lives in canonical form.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarMapping {
    /// Non-negative variable kept as one column
    Single(usize),
    /// Free variable written as `x = pos - neg`
    Split { pos: usize, neg: usize },
}

impl CanonicalProblem {
    /// Wrap an already canonical `min c'x, Ax = b, x >= 0` problem. Every
    /// column is treated as an original non-negative variable `x{j}`.
    pub fn new(objective: Vec<f64>, matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Self {
        let n = objective.len();
        Self {
            objective,
            matrix,
            rhs,
            var_names: (1..=n).map(|j| format!("x{}", j)).collect(),
            free_splits: BTreeMap::new(),
            variables: (0..n).map(VarMapping::Single).collect(),
            direction: Direction::Min,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    pub fn num_columns(&self) -> usize {
        self.objective.len()
    }

    pub fn original_var_count(&self) -> usize {
        self.variables.len()
    }
}

/// Rewrite a general-form problem into canonical form.
///
/// Non-negative variables come first, then the `+`/`-` pairs of free
/// variables, then one slack per inequality (`+1` for `<=`, `-1` for `>=`).
/// Rows with a negative constant are negated as a whole, slack included.
/// A `max` objective is negated so that the result is always minimized.
///
/// Expects a problem that passes [`GeneralProblem::validate`]; missing
/// coefficients are read as zero and surplus ones are ignored.
pub fn canonicalize(problem: &GeneralProblem) -> CanonicalProblem {
    let n = problem.num_variables();

    let mut variables = vec![VarMapping::Single(0); n];
    let mut free_splits = BTreeMap::new();
    let mut next = 0;

    for (i, mapping) in variables.iter_mut().enumerate() {
        if problem.is_non_negative(i) {
            *mapping = VarMapping::Single(next);
            next += 1;
        }
    }
    for (i, mapping) in variables.iter_mut().enumerate() {
        if !problem.is_non_negative(i) {
            *mapping = VarMapping::Split {
                pos: next,
                neg: next + 1,
            };
            free_splits.insert(i, (next, next + 1));
            next += 2;
        }
    }

    let first_slack = next;
    let n_slack = problem
        .constraints
        .iter()
        .filter(|c| c.op != ConstraintOp::Eq)
        .count();
    let total = first_slack + n_slack;

    let mut matrix = vec![vec![0.0; total]; problem.num_constraints()];
    let mut rhs = vec![0.0; problem.num_constraints()];
    let mut slack_idx = first_slack;

    for (i, c) in problem.constraints.iter().enumerate() {
        let row = &mut matrix[i];
        for (mapping, &coef) in variables.iter().zip(&c.coefficients) {
            match *mapping {
                VarMapping::Single(col) => row[col] = coef,
                VarMapping::Split { pos, neg } => {
                    row[pos] = coef;
                    row[neg] = -coef;
                }
            }
        }

        match c.op {
            ConstraintOp::Le => {
                row[slack_idx] = 1.0;
                slack_idx += 1;
            }
            ConstraintOp::Ge => {
                row[slack_idx] = -1.0;
                slack_idx += 1;
            }
            ConstraintOp::Eq => {}
        }

        rhs[i] = c.rhs;
        if c.rhs < 0.0 {
            rhs[i] = -c.rhs;
            for v in row.iter_mut() {
                *v = -*v;
            }
        }
    }

    let sign = match problem.direction {
        Direction::Min => 1.0,
        Direction::Max => -1.0,
    };
    let mut objective = vec![0.0; total];
    for (mapping, &coef) in variables.iter().zip(&problem.objective) {
        match *mapping {
            VarMapping::Single(col) => objective[col] = sign * coef,
            VarMapping::Split { pos, neg } => {
                objective[pos] = sign * coef;
                objective[neg] = -sign * coef;
            }
        }
    }

    let mut var_names = vec![String::new(); total];
    for (i, mapping) in variables.iter().enumerate() {
        match *mapping {
            VarMapping::Single(col) => var_names[col] = format!("x{}", i + 1),
            VarMapping::Split { pos, neg } => {
                var_names[pos] = format!("x{}+", i + 1);
                var_names[neg] = format!("x{}-", i + 1);
            }
        }
    }
    for k in 0..n_slack {
        var_names[first_slack + k] = format!("s{}", k + 1);
    }

    CanonicalProblem {
        objective,
        matrix,
        rhs,
        var_names,
        free_splits,
        variables,
        direction: problem.direction,
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, coefficients: &[f64], names: &[String]) -> fmt::Result {
    let terms: Vec<String> = coefficients
        .iter()
        .zip(names)
        .filter(|(coef, _)| coef.abs() > 1e-10)
        .map(|(coef, name)| format!("{:.2}*{}", coef, name))
        .collect();
    if terms.is_empty() {
        f.write_str("0")
    } else {
        f.write_str(&terms.join(" + "))
    }
}

impl fmt::Display for CanonicalProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Objective: min ")?;
        write_terms(f, &self.objective, &self.var_names)?;
        writeln!(f)?;
        writeln!(f, "Constraints:")?;
        for (row, b) in self.matrix.iter().zip(&self.rhs) {
            write_terms(f, row, &self.var_names)?;
            writeln!(f, " = {:.2}", b)?;
        }
        Ok(())
    }
}
