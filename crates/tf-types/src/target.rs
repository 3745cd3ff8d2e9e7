use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::format_si;
use crate::errors::{TfError, TfResult};

/// Desired high and low output durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub high: f64,
    pub low: f64,
}

impl Target {
    pub fn new(high: f64, low: f64) -> TfResult<Self> {
        let target = Self { high, low };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> TfResult<()> {
        for (name, value) in [("high", self.high), ("low", self.low)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TfError::InvalidTarget {
                    message: format!("{name} time must be a positive duration, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn period(&self) -> f64 {
        self.high + self.low
    }

    pub fn frequency(&self) -> f64 {
        1.0 / self.period()
    }

    pub fn duty(&self) -> f64 {
        self.high / self.period()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "high {} / low {}",
            format_si(self.high, "s"),
            format_si(self.low, "s")
        )
    }
}
