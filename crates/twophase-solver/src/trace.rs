use crate::tableau::{Exchange, Phase, Pivot, Tableau};

/// A step of the solve, as seen by a diagnostic sink.
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// A phase is about to start iterating from this tableau
    PhaseStarted { phase: Phase, tableau: &'a Tableau },
    /// One pivot was applied; `step` counts from 1 within the phase
    Pivoted {
        phase: Phase,
        step: usize,
        pivot: Pivot,
        exchange: Exchange,
        tableau: &'a Tableau,
    },
    /// Optimal value `W` of the auxiliary problem
    AuxiliaryResult { value: f64 },
    /// The auxiliary objective was swapped for the original one
    ObjectiveReplaced { tableau: &'a Tableau },
    /// Phase 2 reached optimality
    Optimal { tableau: &'a Tableau },
}

/// Receives [`TraceEvent`]s while a problem is solved.
pub trait Trace {
    fn record(&mut self, event: TraceEvent<'_>);
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl Trace for NoTrace {
    fn record(&mut self, _event: TraceEvent<'_>) {}
}

impl<T: Trace + ?Sized> Trace for &mut T {
    fn record(&mut self, event: TraceEvent<'_>) {
        (**self).record(event);
    }
}
