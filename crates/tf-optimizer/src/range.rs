//! Continuous range search: a coarse N×N×N grid, optionally polished.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use tf_types::{range_error, Components, IndexCandidate, Range, Target, TfError, TfResult, Unit};

use crate::config::SearchConfig;
use crate::refine::{pattern_search, Axis};
use crate::report::{SearchReport, Solution};
use crate::score::Scorer;
use crate::sweep::sweep;
use crate::Optimizer;

/// Allowed interval for each of R1, R2 and C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSpace {
    pub r1: Range,
    pub r2: Range,
    pub c: Range,
}

impl RangeSpace {
    pub fn new(r1: Range, r2: Range, c: Range) -> TfResult<Self> {
        let space = Self { r1, r2, c };
        space.validate()?;
        Ok(space)
    }

    /// R1 and R2 drawn from the same resistor range.
    pub fn shared(resistors: Range, capacitors: Range) -> TfResult<Self> {
        Self::new(resistors, resistors, capacitors)
    }

    pub fn validate(&self) -> TfResult<()> {
        for (name, range, unit) in [
            ("R1", &self.r1, Unit::Ohm),
            ("R2", &self.r2, Unit::Ohm),
            ("C", &self.c, Unit::Farad),
        ] {
            if range.unit != unit {
                return Err(range_error!("{name} range is in {}, expected {unit}", range.unit));
            }
            range.validate()?;
        }
        Ok(())
    }

    pub fn contains(&self, components: &Components) -> bool {
        self.r1.contains(components.r1)
            && self.r2.contains(components.r2)
            && self.c.contains(components.c)
    }
}

/// Grid search over a [`RangeSpace`].
#[derive(Debug, Clone, Default)]
pub struct RangeOptimizer {
    config: SearchConfig,
}

impl RangeOptimizer {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(&self, target: &Target, space: &RangeSpace) -> TfResult<SearchReport> {
        let started_at = Utc::now();
        self.config.validate()?;
        space.validate()?;
        let scorer = Scorer::new(*target, self.config.weights)?;

        let n = self.config.samples;
        let spacing = self.config.spacing;
        let grids = [
            space.r1.grid(n, spacing)?,
            space.r2.grid(n, spacing)?,
            space.c.grid(n, spacing)?,
        ];
        let space_size = n
            .checked_mul(n)
            .and_then(|nn| nn.checked_mul(n))
            .ok_or_else(|| range_error!("{n} samples per axis overflows the grid size"))?;

        info!(
            "Range search for {}: R1 {}, R2 {}, C {}, {} points per axis",
            target, space.r1, space.r2, space.c, n
        );

        let at = |k: usize| -> TfResult<Components> {
            let idx = IndexCandidate::from_composite(k, n, n);
            Ok(Components::new(
                grid_value(&grids[0], idx.r1_index, "R1 grid")?,
                grid_value(&grids[1], idx.r2_index, "R2 grid")?,
                grid_value(&grids[2], idx.c_index, "C grid")?,
            ))
        };

        let outcome = sweep(space_size, &self.config, |k| scorer.score(&at(k)?))?;
        let grid_best = at(outcome.best.index)?;
        let mut evaluations = outcome.evaluations;

        let (components, refined) = match &self.config.refine {
            Some(options) => {
                let axes = [
                    Axis::new(space.r1, spacing),
                    Axis::new(space.r2, spacing),
                    Axis::new(space.c, spacing),
                ];
                let steps = axes.map(|axis| axis.grid_step(n));
                let polished = pattern_search(
                    &scorer,
                    &axes,
                    grid_best,
                    outcome.best.error,
                    steps,
                    options,
                )?;
                evaluations += polished.evaluations;
                (polished.components, true)
            }
            None => (grid_best, false),
        };

        let solution = Solution::evaluate(&components, &scorer)?;
        info!(
            "Range search done: error {:.3e} (grid {:.3e}) after {} evaluations",
            solution.error, outcome.best.error, evaluations
        );

        Ok(SearchReport {
            strategy: self.name().to_string(),
            solution,
            evaluations,
            space_size,
            exhaustive: outcome.exhaustive,
            sweep_error: outcome.best.error,
            refined,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn grid_value(grid: &[f64], index: usize, axis: &'static str) -> TfResult<f64> {
    grid.get(index).copied().ok_or(TfError::OutOfRangeIndex {
        axis,
        index,
        len: grid.len(),
    })
}

impl Optimizer for RangeOptimizer {
    type Space = RangeSpace;

    fn run(&self, target: &Target, space: &RangeSpace) -> TfResult<SearchReport> {
        self.search(target, space)
    }

    fn name(&self) -> &str {
        "range"
    }
}
