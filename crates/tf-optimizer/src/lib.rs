//! # tf-optimizer
//!
//! Component selection for 555 astable oscillators.
//!
//! Two strategies minimise the mismatch between the desired and the achievable
//! high/low times:
//!
//! - [`CatalogOptimizer`] enumerates every (R1, R2, C) combination of a resistor
//!   and a capacitor catalog and returns stock values only.
//! - [`RangeOptimizer`] scores an N×N×N grid over continuous ranges and polishes
//!   the best grid point with a pattern search.
//!
//! Evaluations fan out over rayon; results do not depend on the thread count.

mod catalog;
mod config;
mod range;
mod refine;
mod report;
mod score;
mod sweep;

pub use catalog::CatalogOptimizer;
pub use config::{
    ExecutionMode, RefineOptions, SearchConfig, DEFAULT_SAMPLES, DEFAULT_SEED,
};
pub use range::{RangeOptimizer, RangeSpace};
pub use report::{SearchReport, Solution};
pub use score::{resolve, ErrorWeights, Scorer};

use tf_types::{ComponentSet, Range, Target, TfResult};

/// Common interface of the search strategies.
pub trait Optimizer {
    /// What the strategy searches over.
    type Space;

    fn run(&self, target: &Target, space: &Self::Space) -> TfResult<SearchReport>;

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

/// Best stock combination for the target high and low times (seconds).
///
/// Uses the default [`SearchConfig`]: equal weights, full enumeration.
pub fn optimize(
    target_high: f64,
    target_low: f64,
    resistors: &ComponentSet,
    capacitors: &ComponentSet,
) -> TfResult<Solution> {
    let target = Target::new(target_high, target_low)?;
    Ok(CatalogOptimizer::default()
        .search(&target, resistors, capacitors)?
        .solution)
}

/// Best free-valued combination with R1 and R2 in `resistors` and C in
/// `capacitors`, on a `samples`-per-axis grid followed by refinement.
pub fn optimize_free(
    target_high: f64,
    target_low: f64,
    resistors: Range,
    capacitors: Range,
    samples: usize,
) -> TfResult<Solution> {
    let target = Target::new(target_high, target_low)?;
    let space = RangeSpace::shared(resistors, capacitors)?;
    Ok(RangeOptimizer::new(SearchConfig::new().with_samples(samples))
        .search(&target, &space)?
        .solution)
}
