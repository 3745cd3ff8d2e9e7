//! Exhaustive search over stock component values.

use chrono::Utc;
use tracing::{info, warn};

use tf_types::{component_set_error, Catalog, ComponentSet, IndexCandidate, Target, TfResult, Unit};

use crate::config::SearchConfig;
use crate::report::{SearchReport, Solution};
use crate::score::{resolve, Scorer};
use crate::sweep::sweep;
use crate::Optimizer;

/// Picks R1, R2 and C from catalogs by scoring every combination.
///
/// R1 and R2 range independently over the resistor set (R1 == R2 is allowed).
/// Among equal errors the first combination in ascending
/// (r1_index, r2_index, c_index) order wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptimizer {
    config: SearchConfig,
}

impl CatalogOptimizer {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(
        &self,
        target: &Target,
        resistors: &ComponentSet,
        capacitors: &ComponentSet,
    ) -> TfResult<SearchReport> {
        let started_at = Utc::now();
        self.config.validate()?;
        check_set(resistors, Unit::Ohm)?;
        check_set(capacitors, Unit::Farad)?;
        let scorer = Scorer::new(*target, self.config.weights)?;

        let n_r = resistors.len();
        let n_c = capacitors.len();
        let space_size = n_r
            .checked_mul(n_r)
            .and_then(|rr| rr.checked_mul(n_c))
            .ok_or_else(|| component_set_error!("{n_r}² × {n_c} combinations overflow"))?;

        info!(
            "Catalog search for {}: {} x {} x {} = {} combinations",
            target, n_r, n_r, n_c, space_size
        );
        if let Some(budget) = self.config.max_evaluations.filter(|b| *b < space_size) {
            warn!(
                "Evaluation budget {} is below {} combinations; sampling instead of enumerating",
                budget, space_size
            );
        }

        let outcome = sweep(space_size, &self.config, |k| {
            let candidate = IndexCandidate::from_composite(k, n_r, n_c);
            scorer.score_indices(&candidate, resistors, capacitors)
        })?;

        let winner = IndexCandidate::from_composite(outcome.best.index, n_r, n_c);
        let solution = Solution::evaluate(&resolve(&winner, resistors, capacitors)?, &scorer)?;

        info!(
            "Catalog search done: indices ({}, {}, {}) error {:.3e}",
            winner.r1_index, winner.r2_index, winner.c_index, solution.error
        );

        Ok(SearchReport {
            strategy: self.name().to_string(),
            solution,
            evaluations: outcome.evaluations,
            space_size,
            exhaustive: outcome.exhaustive,
            sweep_error: outcome.best.error,
            refined: false,
            started_at,
            finished_at: Utc::now(),
        })
    }

    pub fn search_catalog(&self, target: &Target, catalog: &Catalog) -> TfResult<SearchReport> {
        self.search(target, &catalog.resistors, &catalog.capacitors)
    }
}

fn check_set(set: &ComponentSet, unit: Unit) -> TfResult<()> {
    if set.is_empty() {
        return Err(component_set_error!("{} set is empty", unit.quantity()));
    }
    if set.unit() != unit {
        return Err(component_set_error!(
            "expected a {} set, got {} values",
            unit.quantity(),
            set.unit().quantity()
        ));
    }
    Ok(())
}

impl Optimizer for CatalogOptimizer {
    type Space = Catalog;

    fn run(&self, target: &Target, catalog: &Catalog) -> TfResult<SearchReport> {
        self.search_catalog(target, catalog)
    }

    fn name(&self) -> &str {
        "catalog"
    }
}
