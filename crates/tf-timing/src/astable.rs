//! Astable-mode formulas, as free functions and on a validated circuit value.

use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

use tf_types::{degenerate_error, Components, TfError, TfResult, Unit};

/// R1, R2 and C of one astable circuit, checked once on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AstableCircuit {
    r1: f64,
    r2: f64,
    c: f64,
}

impl AstableCircuit {
    /// Resistors must be finite and non-negative, C finite and strictly positive.
    pub fn new(r1: f64, r2: f64, c: f64) -> TfResult<Self> {
        Unit::Ohm.validate(r1)?;
        Unit::Ohm.validate(r2)?;
        Unit::Farad.validate(c)?;
        Ok(Self { r1, r2, c })
    }

    pub fn from_components(components: &Components) -> TfResult<Self> {
        Self::new(components.r1, components.r2, components.c)
    }

    pub fn components(&self) -> Components {
        Components::new(self.r1, self.r2, self.c)
    }

    pub fn period(&self) -> f64 {
        LN_2 * (self.r1 + 2.0 * self.r2) * self.c
    }

    pub fn time_high(&self) -> f64 {
        LN_2 * (self.r1 + self.r2) * self.c
    }

    pub fn time_low(&self) -> f64 {
        LN_2 * self.r2 * self.c
    }

    /// Fails when both resistors are zero and the period collapses.
    pub fn frequency(&self) -> TfResult<f64> {
        Ok(1.0 / self.nonzero_period()?)
    }

    pub fn duty(&self) -> TfResult<f64> {
        duty(self.time_high(), self.nonzero_period()?)
    }

    pub fn profile(&self) -> TfResult<TimingProfile> {
        Ok(TimingProfile {
            frequency: self.frequency()?,
            period: self.period(),
            time_high: self.time_high(),
            time_low: self.time_low(),
            duty: self.duty()?,
        })
    }

    fn nonzero_period(&self) -> TfResult<f64> {
        let period = self.period();
        if period > 0.0 {
            Ok(period)
        } else {
            Err(degenerate_error!(
                "period is zero (R1 = {}, R2 = {})",
                self.r1,
                self.r2
            ))
        }
    }
}

/// Every timing quantity of one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Hz
    pub frequency: f64,
    /// Seconds
    pub period: f64,
    pub time_high: f64,
    pub time_low: f64,
    /// Fraction of the period spent high, in (0, 1]. Exactly 1 when R2 = 0.
    pub duty: f64,
}

/// Oscillation period in seconds.
pub fn period(r1: f64, r2: f64, c: f64) -> TfResult<f64> {
    Ok(AstableCircuit::new(r1, r2, c)?.period())
}

/// Oscillation frequency in Hz.
pub fn frequency(r1: f64, r2: f64, c: f64) -> TfResult<f64> {
    AstableCircuit::new(r1, r2, c)?.frequency()
}

/// Time the output stays high, in seconds.
pub fn time_high(r1: f64, r2: f64, c: f64) -> TfResult<f64> {
    Ok(AstableCircuit::new(r1, r2, c)?.time_high())
}

/// Time the output stays low, in seconds. Independent of R1.
pub fn time_low(r2: f64, c: f64) -> TfResult<f64> {
    Unit::Ohm.validate(r2)?;
    Unit::Farad.validate(c)?;
    Ok(LN_2 * r2 * c)
}

/// Duty cycle from a high time and a period computed by [`time_high`] and [`period`].
pub fn duty(time_high: f64, period: f64) -> TfResult<f64> {
    if !period.is_finite() || period <= 0.0 {
        return Err(degenerate_error!("duty cycle needs a positive period, got {period}"));
    }
    Ok(time_high / period)
}

/// Exact R1 and R2 that hit `high`/`low` with capacitor `c`.
///
/// The plain astable topology cannot go below 50% duty, so `high < low` has no
/// solution.
pub fn solve_resistors(high: f64, low: f64, c: f64) -> TfResult<(f64, f64)> {
    Unit::Farad.validate(c)?;
    if high < low {
        return Err(TfError::InvalidTarget {
            message: format!(
                "high time {high}s shorter than low time {low}s needs duty below 50%"
            ),
        });
    }
    let r2 = low / (LN_2 * c);
    let r1 = (high - low) / (LN_2 * c);
    Ok((r1, r2))
}
