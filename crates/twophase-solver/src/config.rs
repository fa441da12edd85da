/// Numerical settings for the two-phase simplex method.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum pivots per phase
    pub max_iterations: usize,
    /// Reduced costs and pivot-column entries are compared against this
    pub pivot_tolerance: f64,
    /// Largest auxiliary objective still accepted as feasible
    pub feasibility_tolerance: f64,
    /// Slack allowed below zero when checking variable signs
    pub nonnegativity_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            pivot_tolerance: 1e-10,
            feasibility_tolerance: 1e-6,
            nonnegativity_tolerance: 1e-9,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn with_nonnegativity_tolerance(mut self, tol: f64) -> Self {
        self.nonnegativity_tolerance = tol;
        self
    }
}
