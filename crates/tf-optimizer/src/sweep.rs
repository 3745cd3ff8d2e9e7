//! Brute-force minimum over an indexed search space.
//!
//! Both optimizers flatten their space into composite indices `0..space_size`
//! and hand a scoring closure to [`sweep`]. The reduction orders candidates by
//! `(error, index)`, which is a total order, so the winner does not depend on
//! how rayon splits or merges the work.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

use tf_types::{TfError, TfResult};

use crate::config::{ExecutionMode, SearchConfig};

/// One scored point of the space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scored {
    pub index: usize,
    pub error: f64,
}

impl Scored {
    fn min(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => {
                let ord = a
                    .error
                    .total_cmp(&b.error)
                    .then_with(|| a.index.cmp(&b.index));
                Some(if ord == Ordering::Greater { b } else { a })
            }
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SweepOutcome {
    pub best: Scored,
    pub evaluations: usize,
    pub exhaustive: bool,
}

/// Which indices a sweep visits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SweepPlan {
    Exhaustive(usize),
    /// Ascending sample of distinct indices.
    Sampled(Vec<usize>),
}

impl SweepPlan {
    pub fn new(space_size: usize, max_evaluations: Option<usize>, seed: u64) -> Self {
        match max_evaluations {
            Some(budget) if budget < space_size => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut indices = rand::seq::index::sample(&mut rng, space_size, budget).into_vec();
                indices.sort_unstable();
                Self::Sampled(indices)
            }
            _ => Self::Exhaustive(space_size),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Exhaustive(n) => *n,
            Self::Sampled(indices) => indices.len(),
        }
    }
}

/// Score every index in the plan and keep the lowest `(error, index)`.
pub(crate) fn sweep<F>(space_size: usize, config: &SearchConfig, score: F) -> TfResult<SweepOutcome>
where
    F: Fn(usize) -> TfResult<f64> + Sync,
{
    let plan = SweepPlan::new(space_size, config.max_evaluations, config.seed);
    let evaluations = plan.len();
    let exhaustive = matches!(plan, SweepPlan::Exhaustive(_));

    debug!(
        "Sweeping {} of {} candidates ({:?})",
        evaluations, space_size, config.execution
    );

    let scored = |index: usize| score(index).map(|error| Some(Scored { index, error }));

    let best = match (config.execution, plan) {
        (ExecutionMode::Sequential, SweepPlan::Exhaustive(n)) => reduce_seq(0..n, scored)?,
        (ExecutionMode::Sequential, SweepPlan::Sampled(indices)) => {
            reduce_seq(indices.into_iter(), scored)?
        }
        (ExecutionMode::Parallel, SweepPlan::Exhaustive(n)) => {
            reduce_par((0..n).into_par_iter(), scored)?
        }
        (ExecutionMode::Parallel, SweepPlan::Sampled(indices)) => {
            reduce_par(indices.into_par_iter(), scored)?
        }
    };

    let best = best.ok_or_else(|| TfError::InvalidRange {
        message: "search space is empty".to_string(),
    })?;

    Ok(SweepOutcome {
        best,
        evaluations,
        exhaustive,
    })
}

fn reduce_seq<I, F>(indices: I, scored: F) -> TfResult<Option<Scored>>
where
    I: Iterator<Item = usize>,
    F: Fn(usize) -> TfResult<Option<Scored>>,
{
    indices.into_iter().try_fold(None, |best, index| {
        Ok(Scored::min(best, scored(index)?))
    })
}

fn reduce_par<I, F>(indices: I, scored: F) -> TfResult<Option<Scored>>
where
    I: ParallelIterator<Item = usize>,
    F: Fn(usize) -> TfResult<Option<Scored>> + Sync + Send,
{
    indices
        .map(scored)
        .try_reduce(|| None, |a, b| Ok(Scored::min(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(execution: ExecutionMode) -> SearchConfig {
        SearchConfig::new().with_execution(execution)
    }

    #[test]
    fn finds_minimum() {
        let errors = [5.0, 3.0, 4.0, 1.0, 2.0];
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let outcome = sweep(errors.len(), &config(mode), |i| Ok(errors[i])).unwrap();
            assert_eq!(outcome.best, Scored { index: 3, error: 1.0 });
            assert_eq!(outcome.evaluations, 5);
            assert!(outcome.exhaustive);
        }
    }

    #[test]
    fn ties_keep_lowest_index() {
        let errors: Vec<f64> = (0..10_000).map(|i| if i % 7 == 3 { 0.5 } else { 1.0 }).collect();
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let outcome = sweep(errors.len(), &config(mode), |i| Ok(errors[i])).unwrap();
            assert_eq!(outcome.best.index, 3);
        }
    }

    #[test]
    fn errors_propagate() {
        let result = sweep(100, &config(ExecutionMode::Parallel), |i| {
            if i == 42 {
                Err(TfError::OutOfRangeIndex {
                    axis: "test",
                    index: i,
                    len: 42,
                })
            } else {
                Ok(1.0)
            }
        });
        assert!(matches!(result, Err(TfError::OutOfRangeIndex { index: 42, .. })));
    }

    #[test]
    fn budget_samples_deterministically() {
        let plan_a = SweepPlan::new(1_000, Some(50), 9);
        let plan_b = SweepPlan::new(1_000, Some(50), 9);
        assert_eq!(plan_a, plan_b);
        assert_eq!(plan_a.len(), 50);

        match plan_a {
            SweepPlan::Sampled(indices) => {
                assert!(indices.windows(2).all(|w| w[0] < w[1]));
                assert!(indices.iter().all(|i| *i < 1_000));
            }
            SweepPlan::Exhaustive(_) => panic!("expected a sampled plan"),
        }
    }

    #[test]
    fn budget_at_or_above_space_is_exhaustive() {
        assert_eq!(SweepPlan::new(10, Some(10), 1), SweepPlan::Exhaustive(10));
        assert_eq!(SweepPlan::new(10, None, 1), SweepPlan::Exhaustive(10));
    }

    #[test]
    fn sampled_sweep_reports_non_exhaustive() {
        let cfg = config(ExecutionMode::Parallel).with_budget(10);
        let outcome = sweep(1_000, &cfg, |i| Ok(i as f64)).unwrap();
        assert!(!outcome.exhaustive);
        assert_eq!(outcome.evaluations, 10);

        let seq = sweep(1_000, &cfg.clone().with_execution(ExecutionMode::Sequential), |i| {
            Ok(i as f64)
        })
        .unwrap();
        assert_eq!(outcome.best, seq.best);
    }

    #[test]
    fn empty_space_is_an_error() {
        assert!(sweep(0, &config(ExecutionMode::Sequential), |_| Ok(0.0)).is_err());
    }
}
