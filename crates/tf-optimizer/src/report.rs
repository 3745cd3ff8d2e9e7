//! Search outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use tf_timing::{AstableCircuit, TimingProfile};
use tf_types::{format_si, Components, TfResult};

use crate::score::Scorer;

/// Chosen components and the timing they actually produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub r1: f64,
    pub r2: f64,
    pub c: f64,
    pub achieved_high: f64,
    pub achieved_low: f64,
    /// Error of the achieved timing against the target.
    pub error: f64,
}

impl Solution {
    /// Score `components` with the achieved timing recomputed from the formulas.
    pub fn evaluate(components: &Components, scorer: &Scorer) -> TfResult<Self> {
        let circuit = AstableCircuit::from_components(components)?;
        let achieved_high = circuit.time_high();
        let achieved_low = circuit.time_low();
        Ok(Self {
            r1: components.r1,
            r2: components.r2,
            c: components.c,
            achieved_high,
            achieved_low,
            error: scorer.timing_error(achieved_high, achieved_low),
        })
    }

    pub fn components(&self) -> Components {
        Components::new(self.r1, self.r2, self.c)
    }

    pub fn profile(&self) -> TfResult<TimingProfile> {
        AstableCircuit::from_components(&self.components())?.profile()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R1: {}", format_si(self.r1, "Ω"))?;
        writeln!(f, "R2: {}", format_si(self.r2, "Ω"))?;
        writeln!(f, "C:  {}", format_si(self.c, "F"))?;
        writeln!(f, "Time high: {}", format_si(self.achieved_high, "s"))?;
        writeln!(f, "Time low:  {}", format_si(self.achieved_low, "s"))?;
        write!(f, "Error: {:.3e}", self.error)
    }
}

/// A [`Solution`] plus how the search that produced it went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Name of the optimizer that ran.
    pub strategy: String,
    pub solution: Solution,
    /// Candidates actually scored, refinement included.
    pub evaluations: usize,
    /// Candidates in the full search space.
    pub space_size: usize,
    /// False when an evaluation budget forced sampling.
    pub exhaustive: bool,
    /// Best error found by the grid or catalog sweep before any refinement.
    pub sweep_error: f64,
    pub refined: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SearchReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// How much of `sweep_error` the refinement removed (0 when not refined).
    pub fn refinement_gain(&self) -> f64 {
        (self.sweep_error - self.solution.error).max(0.0)
    }
}
