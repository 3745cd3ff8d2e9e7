use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::{format_si, Unit};
use crate::errors::TfResult;
use crate::range_error;

/// How grid points are placed between the ends of a [`Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    /// Evenly spaced in value, endpoints included.
    #[default]
    Linear,
    /// Evenly spaced in log-space. Requires a strictly positive minimum.
    Logarithmic,
}

/// Closed interval `[min, max]` a free-valued component may take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub unit: Unit,
}

impl Range {
    pub fn new(min: f64, max: f64, unit: Unit) -> TfResult<Self> {
        let range = Self { min, max, unit };
        range.validate()?;
        Ok(range)
    }

    pub fn ohms(min: f64, max: f64) -> TfResult<Self> {
        Self::new(min, max, Unit::Ohm)
    }

    pub fn farads(min: f64, max: f64) -> TfResult<Self> {
        Self::new(min, max, Unit::Farad)
    }

    /// Re-check the invariants; deserialised ranges skip the constructor.
    pub fn validate(&self) -> TfResult<()> {
        if self.min > self.max {
            return Err(range_error!(
                "min {} > max {}",
                format_si(self.min, self.unit.symbol()),
                format_si(self.max, self.unit.symbol())
            ));
        }
        self.unit.validate(self.min)?;
        self.unit.validate(self.max)?;
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// `samples` grid points from `min` to `max` inclusive.
    pub fn grid(&self, samples: usize, spacing: Spacing) -> TfResult<Vec<f64>> {
        if samples < 2 {
            return Err(range_error!("need at least 2 samples per axis, got {samples}"));
        }
        let last = (samples - 1) as f64;

        let points = match spacing {
            Spacing::Linear => (0..samples)
                .map(|i| {
                    let t = i as f64 / last;
                    self.clamp(self.min + t * self.width())
                })
                .collect(),
            Spacing::Logarithmic => {
                if self.min <= 0.0 {
                    return Err(range_error!(
                        "logarithmic spacing needs min > 0, got {}",
                        self.min
                    ));
                }
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (0..samples)
                    .map(|i| {
                        let t = i as f64 / last;
                        self.clamp((log_min + t * (log_max - log_min)).exp())
                    })
                    .collect()
            }
        };

        Ok(pin_endpoints(points, self.min, self.max))
    }
}

fn pin_endpoints(mut points: Vec<f64>, min: f64, max: f64) -> Vec<f64> {
    if let Some(first) = points.first_mut() {
        *first = min;
    }
    if let Some(last) = points.last_mut() {
        *last = max;
    }
    points
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            format_si(self.min, self.unit.symbol()),
            format_si(self.max, self.unit.symbol())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TfError;

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(matches!(
            Range::ohms(10.0, 1.0),
            Err(TfError::InvalidRange { .. })
        ));
        assert!(Range::ohms(5.0, 5.0).unwrap().is_degenerate());
    }

    #[test]
    fn test_capacitor_range_must_exclude_zero() {
        assert!(matches!(
            Range::farads(0.0, 1e-6),
            Err(TfError::DegenerateCircuit { .. })
        ));
        assert!(Range::ohms(0.0, 1e3).is_ok());
    }

    #[test]
    fn test_linear_grid_hits_endpoints() {
        let range = Range::farads(1e-12, 1e-3).unwrap();
        let grid = range.grid(50, Spacing::Linear).unwrap();

        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 1e-12);
        assert_eq!(grid[49], 1e-3);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert!(grid.iter().all(|v| range.contains(*v)));
    }

    #[test]
    fn test_log_grid() {
        let range = Range::ohms(100.0, 1e7).unwrap();
        let grid = range.grid(6, Spacing::Logarithmic).unwrap();

        assert_eq!(grid[0], 100.0);
        assert_eq!(grid[5], 1e7);
        assert!((grid[1] - 1e3).abs() < 1e-6);
        assert!((grid[3] - 1e5).abs() < 1e-4);
    }

    #[test]
    fn test_log_grid_needs_positive_min() {
        let range = Range::ohms(0.0, 1e3).unwrap();
        assert!(matches!(
            range.grid(10, Spacing::Logarithmic),
            Err(TfError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_grid_needs_two_samples() {
        let range = Range::ohms(1.0, 2.0).unwrap();
        assert!(matches!(
            range.grid(1, Spacing::Linear),
            Err(TfError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_degenerate_grid_repeats_value() {
        let range = Range::ohms(470.0, 470.0).unwrap();
        let grid = range.grid(3, Spacing::Linear).unwrap();
        assert_eq!(grid, vec![470.0, 470.0, 470.0]);
    }
}
