use tracing::{debug, info, warn};

use crate::auxiliary::solve_phase1;
use crate::canonical::{CanonicalProblem, canonicalize};
use crate::config::SolverConfig;
use crate::error::{Error, SolveError};
use crate::problem::GeneralProblem;
use crate::solution::{CanonicalSolution, Solution, map_to_original, original_objective};
use crate::tableau::{Phase, Tableau};
use crate::trace::{NoTrace, Trace, TraceEvent};

/// Iterate a feasible tableau to optimality on its current objective.
///
/// Returns the canonical values and the minimized objective value.
pub fn solve_phase2(
    tableau: &mut Tableau,
    config: &SolverConfig,
    trace: &mut dyn Trace,
) -> Result<(Vec<f64>, f64), SolveError> {
    trace.record(TraceEvent::PhaseStarted {
        phase: Phase::Primal,
        tableau: &*tableau,
    });

    let mut step = 0;
    while let Some(pivot) = tableau.find_pivot(config.pivot_tolerance)? {
        if step == config.max_iterations {
            return Err(SolveError::IterationLimitExceeded {
                phase: Phase::Primal,
                limit: config.max_iterations,
            });
        }
        step += 1;

        let exchange = tableau.pivot(pivot);
        debug!(
            step,
            row = pivot.row,
            col = pivot.col,
            entering = tableau.var_name(exchange.entering),
            leaving = tableau.var_name(exchange.leaving),
            "phase 2 pivot"
        );
        trace.record(TraceEvent::Pivoted {
            phase: Phase::Primal,
            step,
            pivot,
            exchange,
            tableau: &*tableau,
        });
    }

    trace.record(TraceEvent::Optimal { tableau: &*tableau });
    let (values, objective_value) = tableau.solution();
    info!(iterations = step, objective_value, "phase 2 finished");
    Ok((values, objective_value))
}

/// Solve a canonical problem with the two-phase simplex method.
pub fn solve_lp(
    problem: &CanonicalProblem,
    config: &SolverConfig,
    trace: &mut dyn Trace,
) -> Result<CanonicalSolution, SolveError> {
    let mut counter = PivotCounter { inner: trace, phase1: 0, phase2: 0 };

    let mut tableau = solve_phase1(problem, config, &mut counter)?;
    let (values, objective_value) = solve_phase2(&mut tableau, config, &mut counter)?;

    let solution = CanonicalSolution {
        values,
        objective_value,
        basis: tableau.basis().to_vec(),
        phase1_iterations: counter.phase1,
        phase2_iterations: counter.phase2,
    };
    check_feasible(problem, &solution, config)?;
    Ok(solution)
}

/// Reject an optimum whose values drifted outside the feasible region.
fn check_feasible(
    problem: &CanonicalProblem,
    solution: &CanonicalSolution,
    config: &SolverConfig,
) -> Result<(), SolveError> {
    if solution.is_feasible(problem, config.feasibility_tolerance, config.nonnegativity_tolerance)
        && solution.objective_value.is_finite()
    {
        return Ok(());
    }
    let residual = solution.residual(problem);
    warn!(residual, "optimal basis drifted outside the feasible region");
    Err(SolveError::Inaccurate { residual })
}

/// Forwards events while counting pivots per phase.
struct PivotCounter<'a> {
    inner: &'a mut dyn Trace,
    phase1: usize,
    phase2: usize,
}

impl Trace for PivotCounter<'_> {
    fn record(&mut self, event: TraceEvent<'_>) {
        if let TraceEvent::Pivoted { phase, .. } = event {
            match phase {
                Phase::Auxiliary => self.phase1 += 1,
                Phase::Primal => self.phase2 += 1,
            }
        }
        self.inner.record(event);
    }
}

/// Two-phase simplex solver for general-form problems
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.config.pivot_tolerance = tol;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Validate, canonicalize and solve `problem`, mapping the optimum back to
    /// the original variables and direction.
    pub fn solve(&self, problem: &GeneralProblem) -> Result<Solution, Error> {
        self.solve_traced(problem, &mut NoTrace)
    }

    pub fn solve_traced(&self, problem: &GeneralProblem, trace: &mut dyn Trace) -> Result<Solution, Error> {
        problem.validate()?;
        let canonical = canonicalize(problem);
        debug!(
            rows = canonical.num_rows(),
            columns = canonical.num_columns(),
            free = canonical.free_splits.len(),
            "canonical form built"
        );

        let solution = solve_lp(&canonical, &self.config, trace)?;

        Ok(Solution {
            values: map_to_original(&canonical, &solution.values),
            objective_value: original_objective(problem.direction, solution.objective_value),
            canonical: solution,
        })
    }
}
