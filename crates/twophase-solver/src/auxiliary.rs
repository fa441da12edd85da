use tracing::{debug, info, warn};

use crate::canonical::CanonicalProblem;
use crate::config::SolverConfig;
use crate::error::{Infeasibility, SolveError};
use crate::tableau::{Phase, Tableau};
use crate::trace::{Trace, TraceEvent};

/// Phase-1 problem: the original columns plus one artificial column per row,
/// minimizing the sum of the artificials.
#[derive(Debug, Clone)]
pub struct AuxiliaryProblem {
    problem: CanonicalProblem,
    n_original: usize,
}

impl AuxiliaryProblem {
    pub fn new(original: &CanonicalProblem) -> Self {
        let m = original.num_rows();
        let n = original.num_columns();

        let mut objective = vec![0.0; n + m];
        objective[n..].fill(1.0);

        let matrix = original
            .matrix
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut extended = row.clone();
                extended.resize(n + m, 0.0);
                extended[n + i] = 1.0;
                extended
            })
            .collect();

        let mut var_names = original.var_names.clone();
        var_names.extend((1..=m).map(|k| format!("y{}", k)));

        Self {
            problem: CanonicalProblem {
                objective,
                matrix,
                rhs: original.rhs.clone(),
                var_names,
                free_splits: original.free_splits.clone(),
                variables: original.variables.clone(),
                direction: original.direction,
            },
            n_original: n,
        }
    }

    pub fn problem(&self) -> &CanonicalProblem {
        &self.problem
    }

    /// Number of columns of the problem this was built from
    pub fn n_original(&self) -> usize {
        self.n_original
    }

    /// The artificial variables, one per row
    pub fn initial_basis(&self) -> Vec<usize> {
        (self.n_original..self.n_original + self.problem.num_rows()).collect()
    }

    pub fn is_artificial(&self, index: usize) -> bool {
        index >= self.n_original
    }
}

/// Find a feasible basis for `problem` and return its tableau, already
/// switched to the original objective.
///
/// Artificial columns are dropped as soon as they leave the basis. A
/// non-zero auxiliary optimum or an artificial variable left in the basis
/// (even at value zero) both mean the problem is reported infeasible.
pub fn solve_phase1(
    problem: &CanonicalProblem,
    config: &SolverConfig,
    trace: &mut dyn Trace,
) -> Result<Tableau, SolveError> {
    let auxiliary = AuxiliaryProblem::new(problem);
    let n = auxiliary.n_original();

    let mut tableau = Tableau::build_in_phase(auxiliary.problem(), auxiliary.initial_basis(), Phase::Auxiliary)?;
    trace.record(TraceEvent::PhaseStarted {
        phase: Phase::Auxiliary,
        tableau: &tableau,
    });

    let mut step = 0;
    while let Some(pivot) = tableau.find_pivot(config.pivot_tolerance)? {
        if step == config.max_iterations {
            return Err(SolveError::IterationLimitExceeded {
                phase: Phase::Auxiliary,
                limit: config.max_iterations,
            });
        }
        step += 1;

        let exchange = tableau.pivot(pivot);
        let dropped = tableau.remove_auxiliary_columns(n);
        debug!(
            step,
            row = pivot.row,
            col = pivot.col,
            entering = tableau.var_name(exchange.entering),
            leaving = tableau.var_name(exchange.leaving),
            dropped,
            "phase 1 pivot"
        );
        trace.record(TraceEvent::Pivoted {
            phase: Phase::Auxiliary,
            step,
            pivot,
            exchange,
            tableau: &tableau,
        });
    }

    let w = tableau.objective_value();
    trace.record(TraceEvent::AuxiliaryResult { value: w });
    info!(iterations = step, w, "phase 1 finished");

    // NaN fails this test too
    if !(w.abs() <= config.feasibility_tolerance) {
        warn!(w, "auxiliary objective is non-zero");
        return Err(SolveError::Infeasible(Infeasibility::AuxiliaryObjective(w)));
    }

    if let Some(&index) = tableau.basis().iter().find(|&&j| auxiliary.is_artificial(j)) {
        let name = tableau.var_name(index).to_string();
        warn!(variable = name.as_str(), "artificial variable left in basis");
        return Err(SolveError::Infeasible(Infeasibility::ArtificialInBasis(name)));
    }

    tableau.promote_to_original_objective(problem)?;
    trace.record(TraceEvent::ObjectiveReplaced { tableau: &tableau });
    Ok(tableau)
}
