use std::fmt;
use std::io::{self, Write};

use twophase_solver::{Direction, GeneralProblem, Phase, Solution, Trace, TraceEvent};

/// Printable result of a solve, in original variables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub direction: Direction,
    pub variables: Vec<Assignment>,
    pub objective_value: f64,
    pub phase1_iterations: usize,
    pub phase2_iterations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: f64,
}

impl Report {
    pub fn new(problem: &GeneralProblem, solution: &Solution) -> Self {
        Self {
            direction: problem.direction,
            variables: solution
                .values
                .iter()
                .enumerate()
                .map(|(i, &value)| Assignment {
                    name: format!("x{}", i + 1),
                    value,
                })
                .collect(),
            objective_value: solution.objective_value,
            phase1_iterations: solution.canonical.phase1_iterations,
            phase2_iterations: solution.canonical.phase2_iterations,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimal solution:")?;
        for a in &self.variables {
            writeln!(f, "{} = {:.6}", a.name, a.value)?;
        }
        writeln!(f, "Objective value ({}): {:.6}", self.direction, self.objective_value)
    }
}

/// Trace sink writing the step-by-step solution log as text.
///
/// Write errors do not interrupt the solve; the first one is kept and
/// returned by [`WriterTrace::finish`].
pub struct WriterTrace<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterTrace<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, error: None }
    }

    /// Write free-form text to the log, e.g. section headers.
    pub fn note(&mut self, text: impl fmt::Display) {
        self.emit(format_args!("{}\n", text));
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_none() {
            if let Err(e) = self.writer.write_fmt(args) {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> Trace for WriterTrace<W> {
    fn record(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::PhaseStarted { phase, tableau } => match phase {
                Phase::Auxiliary => {
                    self.emit(format_args!("=== Auxiliary problem ===\n"));
                    self.emit(format_args!("Initial tableau:\n{}", tableau));
                }
                Phase::Primal => {
                    self.emit(format_args!("\n=== Original problem ===\n"));
                }
            },
            TraceEvent::Pivoted {
                step,
                pivot,
                exchange,
                tableau,
                ..
            } => {
                self.emit(format_args!("\nStep {}:\n", step));
                self.emit(format_args!(
                    "Pivot: row {}, column {} ({} enters, {} leaves)\n",
                    pivot.row,
                    pivot.col,
                    tableau.var_name(exchange.entering),
                    tableau.var_name(exchange.leaving),
                ));
                self.emit(format_args!("{}", tableau));
            }
            TraceEvent::AuxiliaryResult { value } => {
                self.emit(format_args!("\nAuxiliary result: W = {:.6}\n", value));
            }
            TraceEvent::ObjectiveReplaced { tableau } => {
                self.emit(format_args!(
                    "\nTableau after switching to the original objective:\n{}",
                    tableau
                ));
            }
            TraceEvent::Optimal { tableau } => {
                self.emit(format_args!("\nOptimal solution found.\nFinal tableau:\n{}", tableau));
            }
        }
    }
}
