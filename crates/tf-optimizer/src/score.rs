//! Error metric shared by every search strategy.

use serde::{Deserialize, Serialize};
use tracing::warn;

use tf_timing::AstableCircuit;
use tf_types::{ComponentSet, Components, IndexCandidate, Target, TfError, TfResult};

/// Relative weight of the high-time and low-time mismatch.
///
/// The default weights both terms equally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorWeights {
    pub high: f64,
    pub low: f64,
}

impl ErrorWeights {
    pub fn new(high: f64, low: f64) -> TfResult<Self> {
        let weights = Self { high, low };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> TfResult<()> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(self.high) || !valid(self.low) {
            return Err(TfError::InvalidWeights {
                message: format!(
                    "weights must be finite and non-negative, got high {} low {}",
                    self.high, self.low
                ),
            });
        }
        if self.high == 0.0 && self.low == 0.0 {
            return Err(TfError::InvalidWeights {
                message: "at least one weight must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ErrorWeights {
    fn default() -> Self {
        Self {
            high: 1.0,
            low: 1.0,
        }
    }
}

/// Scores candidate circuits against a [`Target`].
///
/// `error = w_high * |t_high - target.high| + w_low * |t_low - target.low|`
///
/// Discrete and continuous candidates go through the same arithmetic, so both
/// search modes rank identical circuits identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    target: Target,
    weights: ErrorWeights,
}

impl Scorer {
    pub fn new(target: Target, weights: ErrorWeights) -> TfResult<Self> {
        target.validate()?;
        weights.validate()?;
        if target.high < target.low {
            warn!(
                "Target {} needs a duty cycle below 50%, which a plain astable cannot reach",
                target
            );
        }
        Ok(Self { target, weights })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn weights(&self) -> &ErrorWeights {
        &self.weights
    }

    /// Error for already-computed high and low times.
    pub fn timing_error(&self, time_high: f64, time_low: f64) -> f64 {
        self.weights.high * (time_high - self.target.high).abs()
            + self.weights.low * (time_low - self.target.low).abs()
    }

    pub fn circuit_error(&self, circuit: &AstableCircuit) -> f64 {
        self.timing_error(circuit.time_high(), circuit.time_low())
    }

    /// Continuous variant: score a concrete (R1, R2, C) triple.
    pub fn score(&self, components: &Components) -> TfResult<f64> {
        Ok(self.circuit_error(&AstableCircuit::from_components(components)?))
    }

    /// Discrete variant: resolve catalog indices, then score the values.
    pub fn score_indices(
        &self,
        candidate: &IndexCandidate,
        resistors: &ComponentSet,
        capacitors: &ComponentSet,
    ) -> TfResult<f64> {
        self.score(&resolve(candidate, resistors, capacitors)?)
    }
}

/// Look up the component values a catalog candidate points at.
pub fn resolve(
    candidate: &IndexCandidate,
    resistors: &ComponentSet,
    capacitors: &ComponentSet,
) -> TfResult<Components> {
    Ok(Components::new(
        resistors.get(candidate.r1_index)?,
        resistors.get(candidate.r2_index)?,
        capacitors.get(candidate.c_index)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(high: f64, low: f64) -> Scorer {
        Scorer::new(Target::new(high, low).unwrap(), ErrorWeights::default()).unwrap()
    }

    #[test]
    fn exact_match_scores_zero() {
        let circuit = AstableCircuit::new(1e3, 1e4, 1e-6).unwrap();
        let s = scorer(circuit.time_high(), circuit.time_low());
        assert_eq!(s.circuit_error(&circuit), 0.0);
    }

    #[test]
    fn error_is_sum_of_absolute_mismatches() {
        let s = scorer(1.0, 0.5);
        assert!((s.timing_error(1.25, 0.25) - 0.5).abs() < 1e-12);
        assert!((s.timing_error(0.75, 0.75) - 0.5).abs() < 1e-12);
        assert!(s.timing_error(3.0, 9.0) > 0.0);
    }

    #[test]
    fn weights_scale_each_term() {
        let target = Target::new(1.0, 0.5).unwrap();
        let s = Scorer::new(target, ErrorWeights::new(2.0, 0.0).unwrap()).unwrap();
        assert!((s.timing_error(1.5, 100.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_weights_rejected() {
        assert!(matches!(
            ErrorWeights::new(0.0, 0.0),
            Err(TfError::InvalidWeights { .. })
        ));
        assert!(ErrorWeights::new(-1.0, 1.0).is_err());
        assert!(ErrorWeights::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn discrete_and_continuous_variants_agree() {
        let resistors = ComponentSet::resistors(vec![1e3, 1e4, 1e5]).unwrap();
        let capacitors = ComponentSet::capacitors(vec![1e-6, 1e-5]).unwrap();
        let s = scorer(0.01, 0.005);

        let candidate = IndexCandidate::new(2, 1, 0);
        let discrete = s.score_indices(&candidate, &resistors, &capacitors).unwrap();
        let continuous = s.score(&Components::new(1e5, 1e4, 1e-6)).unwrap();
        assert_eq!(discrete, continuous);
    }

    #[test]
    fn out_of_range_index_surfaces() {
        let resistors = ComponentSet::resistors(vec![1e3]).unwrap();
        let capacitors = ComponentSet::capacitors(vec![1e-6]).unwrap();
        let s = scorer(0.01, 0.005);

        let result = s.score_indices(&IndexCandidate::new(0, 1, 0), &resistors, &capacitors);
        assert!(matches!(result, Err(TfError::OutOfRangeIndex { index: 1, .. })));
    }

    #[test]
    fn zero_capacitor_is_degenerate() {
        let s = scorer(0.01, 0.005);
        assert!(matches!(
            s.score(&Components::new(1e3, 1e3, 0.0)),
            Err(TfError::DegenerateCircuit { .. })
        ));
    }
}
