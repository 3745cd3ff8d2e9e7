//! Derivative-free polish of a grid optimum.
//!
//! Compass search over the three axes plus every pairwise diagonal. The error
//! is an L1 sum, so along a matched high time only diagonal moves that trade R1
//! against R2 can still lower the low-time term.
//!
//! A trial point replaces the incumbent only when it strictly lowers the error;
//! the result is never worse than the starting grid point.

use tracing::debug;

use tf_types::{Components, Range, Spacing, TfResult};

use crate::config::RefineOptions;
use crate::score::Scorer;

/// One search axis in the coordinates the grid was laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Axis {
    pub range: Range,
    pub spacing: Spacing,
}

impl Axis {
    pub fn new(range: Range, spacing: Spacing) -> Self {
        Self { range, spacing }
    }

    fn to_coord(&self, value: f64) -> f64 {
        match self.spacing {
            Spacing::Linear => value,
            Spacing::Logarithmic => value.ln(),
        }
    }

    fn value_at(&self, coord: f64) -> f64 {
        let value = match self.spacing {
            Spacing::Linear => coord,
            Spacing::Logarithmic => coord.exp(),
        };
        self.range.clamp(value)
    }

    fn coord_width(&self) -> f64 {
        self.to_coord(self.range.max) - self.to_coord(self.range.min)
    }

    /// Distance between neighbouring grid points.
    pub fn grid_step(&self, samples: usize) -> f64 {
        self.coord_width() / (samples.max(2) - 1) as f64
    }
}

/// Result of a pattern search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Polished {
    pub components: Components,
    pub error: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

fn directions() -> Vec<[f64; 3]> {
    let mut dirs = Vec::with_capacity(18);
    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let mut d = [0.0; 3];
            d[axis] = sign;
            dirs.push(d);
        }
    }
    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        for (si, sj) in [(1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (-1.0, -1.0)] {
            let mut d = [0.0; 3];
            d[i] = si;
            d[j] = sj;
            dirs.push(d);
        }
    }
    dirs
}

pub(crate) fn pattern_search(
    scorer: &Scorer,
    axes: &[Axis; 3],
    start: Components,
    start_error: f64,
    initial_steps: [f64; 3],
    options: &RefineOptions,
) -> TfResult<Polished> {
    let to_components = |coords: &[f64; 3]| {
        Components::new(
            axes[0].value_at(coords[0]),
            axes[1].value_at(coords[1]),
            axes[2].value_at(coords[2]),
        )
    };

    let mut best = start;
    let mut best_error = start_error;
    let mut point = [
        axes[0].to_coord(start.r1),
        axes[1].to_coord(start.r2),
        axes[2].to_coord(start.c),
    ];
    let mut steps = initial_steps;
    let floors = axes.map(|axis| axis.coord_width() * options.tolerance);
    let dirs = directions();

    let mut iterations = 0;
    let mut evaluations = 0;

    while iterations < options.max_iterations && best_error > 0.0 {
        let active: [bool; 3] =
            std::array::from_fn(|i| axes[i].coord_width() > 0.0 && steps[i] > floors[i]);
        if !active.iter().any(|a| *a) {
            break;
        }
        iterations += 1;

        let mut improved = false;
        for dir in &dirs {
            if (0..3).any(|i| dir[i] != 0.0 && !active[i]) {
                continue;
            }
            let trial: [f64; 3] = std::array::from_fn(|i| point[i] + dir[i] * steps[i]);
            let candidate = to_components(&trial);
            if candidate == best {
                continue;
            }

            let error = scorer.score(&candidate)?;
            evaluations += 1;
            if error < best_error {
                best = candidate;
                best_error = error;
                point = [
                    axes[0].to_coord(candidate.r1),
                    axes[1].to_coord(candidate.r2),
                    axes[2].to_coord(candidate.c),
                ];
                improved = true;
                break;
            }
        }

        if !improved {
            for step in &mut steps {
                *step *= 0.5;
            }
        }
    }

    debug!(
        "Pattern search: {} iterations, {} evaluations, error {:.3e} -> {:.3e}",
        iterations, evaluations, start_error, best_error
    );

    Ok(Polished {
        components: best,
        error: best_error,
        iterations,
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ErrorWeights;
    use tf_types::Target;

    fn linear_axes(r: Range, c: Range) -> [Axis; 3] {
        [
            Axis::new(r, Spacing::Linear),
            Axis::new(r, Spacing::Linear),
            Axis::new(c, Spacing::Linear),
        ]
    }

    #[test]
    fn never_worse_than_start() {
        let scorer = Scorer::new(Target::new(0.01, 0.005).unwrap(), ErrorWeights::default()).unwrap();
        let axes = linear_axes(Range::ohms(1e3, 1e5).unwrap(), Range::farads(1e-7, 1e-6).unwrap());
        let start = Components::new(5e4, 5e4, 5e-7);
        let start_error = scorer.score(&start).unwrap();

        let steps = axes.map(|a| a.grid_step(10));
        let polished =
            pattern_search(&scorer, &axes, start, start_error, steps, &RefineOptions::default())
                .unwrap();

        assert!(polished.error <= start_error);
        assert_eq!(polished.error, scorer.score(&polished.components).unwrap());
        assert!(axes[0].range.contains(polished.components.r1));
        assert!(axes[1].range.contains(polished.components.r2));
        assert!(axes[2].range.contains(polished.components.c));
    }

    #[test]
    fn converges_on_reachable_target() {
        // 10k / 10k / 1µF gives high = 2 * low; start well off it.
        let target_circuit = tf_timing::AstableCircuit::new(1e4, 1e4, 1e-6).unwrap();
        let scorer = Scorer::new(
            Target::new(target_circuit.time_high(), target_circuit.time_low()).unwrap(),
            ErrorWeights::default(),
        )
        .unwrap();
        let axes = linear_axes(Range::ohms(1e3, 1e5).unwrap(), Range::farads(1e-6, 1e-6).unwrap());
        let start = Components::new(3e4, 2e3, 1e-6);
        let start_error = scorer.score(&start).unwrap();

        let steps = axes.map(|a| a.grid_step(20));
        let polished =
            pattern_search(&scorer, &axes, start, start_error, steps, &RefineOptions::default())
                .unwrap();

        assert!(polished.error < 1e-6 * start_error);
        assert_eq!(polished.components.c, 1e-6);
    }

    #[test]
    fn degenerate_axes_stay_fixed() {
        let scorer = Scorer::new(Target::new(1.0, 0.5).unwrap(), ErrorWeights::default()).unwrap();
        let r = Range::ohms(1e4, 1e4).unwrap();
        let c = Range::farads(1e-6, 1e-6).unwrap();
        let axes = linear_axes(r, c);
        let start = Components::new(1e4, 1e4, 1e-6);
        let start_error = scorer.score(&start).unwrap();

        let polished =
            pattern_search(&scorer, &axes, start, start_error, [0.0; 3], &RefineOptions::default())
                .unwrap();

        assert_eq!(polished.components, start);
        assert_eq!(polished.evaluations, 0);
    }

    #[test]
    fn log_axes_round_trip() {
        let axis = Axis::new(Range::ohms(100.0, 1e7).unwrap(), Spacing::Logarithmic);
        let coord = axis.to_coord(1e4);
        assert!((axis.value_at(coord) - 1e4).abs() < 1e-6);
        assert_eq!(axis.value_at(1e9), 1e7);
    }

    #[test]
    fn eighteen_directions() {
        let dirs = directions();
        assert_eq!(dirs.len(), 18);
        assert!(dirs.iter().all(|d| d.iter().any(|v| *v != 0.0)));
    }
}
