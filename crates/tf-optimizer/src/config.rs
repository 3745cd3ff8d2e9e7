//! Search configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tf_types::{config_error, range_error, Spacing, TfResult};

use crate::score::ErrorWeights;

/// Default number of grid points per axis for range search.
pub const DEFAULT_SAMPLES: usize = 50;

/// Default seed for budget-limited sampling.
pub const DEFAULT_SEED: u64 = 555;

/// Whether candidate evaluations fan out over the rayon pool.
///
/// Both modes return the same result; ties are broken on the lowest index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

/// Local polish applied to the best grid point of a range search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineOptions {
    /// Upper bound on pattern-search iterations.
    pub max_iterations: usize,
    /// Stop once every step is below `tolerance` times its axis width.
    pub tolerance: f64,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            tolerance: 1e-9,
        }
    }
}

/// Knobs shared by the catalog and range optimizers.
///
/// Every field has a default, so a JSON config only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub weights: ErrorWeights,
    pub execution: ExecutionMode,

    /// Grid points per axis for range search.
    pub samples: usize,
    pub spacing: Spacing,

    /// `None` keeps the raw grid optimum.
    pub refine: Option<RefineOptions>,

    /// Cap on scored candidates. When the space is larger, a seeded uniform
    /// sample of this many candidates is scored instead of all of them.
    pub max_evaluations: Option<usize>,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: ErrorWeights::default(),
            execution: ExecutionMode::Parallel,
            samples: DEFAULT_SAMPLES,
            spacing: Spacing::Linear,
            refine: Some(RefineOptions::default()),
            max_evaluations: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: ErrorWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_refinement(mut self, options: RefineOptions) -> Self {
        self.refine = Some(options);
        self
    }

    pub fn without_refinement(mut self) -> Self {
        self.refine = None;
        self
    }

    pub fn with_budget(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> TfResult<()> {
        self.weights.validate()?;
        if self.samples < 2 {
            return Err(range_error!(
                "need at least 2 samples per axis, got {}",
                self.samples
            ));
        }
        if self.max_evaluations == Some(0) {
            return Err(config_error!("max_evaluations must be at least 1"));
        }
        if let Some(refine) = &self.refine {
            if !refine.tolerance.is_finite() || refine.tolerance <= 0.0 {
                return Err(config_error!(
                    "refine tolerance must be positive, got {}",
                    refine.tolerance
                ));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> TfResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> TfResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_types::TfError;

    #[test]
    fn defaults_match_brute_force_settings() {
        let config = SearchConfig::default();
        assert_eq!(config.samples, 50);
        assert_eq!(config.spacing, Spacing::Linear);
        assert_eq!(config.weights, ErrorWeights::default());
        assert!(config.refine.is_some());
        assert!(config.max_evaluations.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = SearchConfig::new()
            .with_samples(20)
            .with_spacing(Spacing::Logarithmic)
            .with_execution(ExecutionMode::Sequential)
            .without_refinement()
            .with_budget(1_000)
            .with_seed(7);

        assert_eq!(config.samples, 20);
        assert_eq!(config.execution, ExecutionMode::Sequential);
        assert!(config.refine.is_none());
        assert_eq!(config.max_evaluations, Some(1_000));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn too_few_samples_is_invalid_range() {
        let config = SearchConfig::new().with_samples(1);
        assert!(matches!(config.validate(), Err(TfError::InvalidRange { .. })));
    }

    #[test]
    fn zero_budget_rejected() {
        let config = SearchConfig::new().with_budget(0);
        assert!(matches!(config.validate(), Err(TfError::Config(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SearchConfig::from_json_str(
            r#"{ "samples": 30, "spacing": "logarithmic", "weights": { "high": 2.0, "low": 1.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.samples, 30);
        assert_eq!(config.spacing, Spacing::Logarithmic);
        assert_eq!(config.weights.high, 2.0);
        assert_eq!(config.execution, ExecutionMode::Parallel);
        assert_eq!(config.seed, DEFAULT_SEED);

        let no_refine = SearchConfig::from_json_str(r#"{ "refine": null }"#).unwrap();
        assert!(no_refine.refine.is_none());
    }

    #[test]
    fn invalid_json_config_rejected() {
        assert!(matches!(
            SearchConfig::from_json_str(r#"{ "samples": 1 }"#),
            Err(TfError::InvalidRange { .. })
        ));
        assert!(matches!(
            SearchConfig::from_json_str("not json"),
            Err(TfError::Serialization(_))
        ));
    }
}
