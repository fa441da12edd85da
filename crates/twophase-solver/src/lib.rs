mod auxiliary;
mod canonical;
mod config;
mod error;
mod problem;
mod simplex;
mod solution;
mod tableau;
mod trace;

pub use auxiliary::{AuxiliaryProblem, solve_phase1};
pub use canonical::{CanonicalProblem, VarMapping, canonicalize};
pub use config::SolverConfig;
pub use error::{Error, Infeasibility, ProblemError, SolveError};
pub use problem::{Constraint, ConstraintOp, Direction, GeneralProblem};
pub use simplex::{Solver, solve_lp, solve_phase2};
pub use solution::{CanonicalSolution, Solution, map_to_original, original_objective};
pub use tableau::{Exchange, Phase, Pivot, Tableau};
pub use trace::{NoTrace, Trace, TraceEvent};
