//! Stock component catalogs.
//!
//! A [`ComponentSet`] is an ascending list of distinct values of one unit; the
//! optimizer only ever addresses it by index. A [`Catalog`] pairs a resistor set
//! with a capacitor set and replaces any notion of process-wide default parts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::component_set_error;
use crate::components::{format_si, Unit};
use crate::errors::{TfError, TfResult};
use crate::range::Range;

/// Ordered, non-empty set of stock values for one kind of component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponentSet")]
pub struct ComponentSet {
    unit: Unit,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawComponentSet {
    unit: Unit,
    values: Vec<f64>,
}

impl TryFrom<RawComponentSet> for ComponentSet {
    type Error = TfError;

    fn try_from(raw: RawComponentSet) -> TfResult<Self> {
        ComponentSet::new(raw.unit, raw.values)
    }
}

impl ComponentSet {
    /// Build a set from values that are already ascending and distinct.
    pub fn new(unit: Unit, values: Vec<f64>) -> TfResult<Self> {
        if values.is_empty() {
            return Err(component_set_error!("{} set is empty", unit.quantity()));
        }
        for value in &values {
            unit.validate(*value)
                .map_err(|e| component_set_error!("{e}"))?;
        }
        if let Some(pair) = values.windows(2).find(|w| w[0] >= w[1]) {
            return Err(component_set_error!(
                "values must be strictly ascending, found {} before {}",
                format_si(pair[0], unit.symbol()),
                format_si(pair[1], unit.symbol())
            ));
        }
        Ok(Self { unit, values })
    }

    /// Sort and de-duplicate before validating.
    pub fn from_unsorted(unit: Unit, mut values: Vec<f64>) -> TfResult<Self> {
        values.sort_by(f64::total_cmp);
        values.dedup();
        Self::new(unit, values)
    }

    pub fn resistors(values: Vec<f64>) -> TfResult<Self> {
        Self::new(Unit::Ohm, values)
    }

    pub fn capacitors(values: Vec<f64>) -> TfResult<Self> {
        Self::new(Unit::Farad, values)
    }

    /// Every value of `series` for each decade `10^min_exp ..= 10^max_exp`.
    pub fn e_series(series: ESeries, unit: Unit, min_exp: i32, max_exp: i32) -> TfResult<Self> {
        if min_exp > max_exp {
            return Err(component_set_error!(
                "decade span {min_exp}..={max_exp} is empty"
            ));
        }
        Self::new(unit, series.decades(min_exp, max_exp))
    }

    /// Values of `series` that fall inside `[min, max]`.
    pub fn e_series_between(series: ESeries, unit: Unit, min: f64, max: f64) -> TfResult<Self> {
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(component_set_error!(
                "E-series bounds must satisfy 0 < min <= max, got {min} and {max}"
            ));
        }
        // One decade of margin each side; the filter below does the exact cut.
        let min_exp = min.log10().floor() as i32 - 1;
        let max_exp = max.log10().floor() as i32 + 1;
        // Relative slack so a bound written as 4.7e-9 keeps the 4.7nF part.
        let values = series
            .decades(min_exp, max_exp)
            .into_iter()
            .filter(|v| *v >= min * (1.0 - 1e-9) && *v <= max * (1.0 + 1e-9))
            .collect::<Vec<_>>();
        if values.is_empty() {
            return Err(component_set_error!(
                "no {series} values between {} and {}",
                format_si(min, unit.symbol()),
                format_si(max, unit.symbol())
            ));
        }
        Self::new(unit, values)
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn get(&self, index: usize) -> TfResult<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(TfError::OutOfRangeIndex {
                axis: self.axis_name(),
                index,
                len: self.values.len(),
            })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|v| *v == value)
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// The closed interval spanned by the set.
    pub fn span(&self) -> Range {
        Range {
            min: self.min(),
            max: self.max(),
            unit: self.unit,
        }
    }

    fn axis_name(&self) -> &'static str {
        match self.unit {
            Unit::Ohm => "resistor set",
            Unit::Farad => "capacitor set",
        }
    }
}

impl fmt::Display for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} values ({} .. {})",
            self.len(),
            self.unit.quantity(),
            format_si(self.min(), self.unit.symbol()),
            format_si(self.max(), self.unit.symbol())
        )
    }
}

/// `mantissa * 10^exp`, computed so the result equals the decimal literal.
fn decade_value(mantissa: f64, exp: i32) -> f64 {
    let tenths = (mantissa * 10.0).round();
    let shift = exp - 1;
    if shift >= 0 {
        tenths * 10f64.powi(shift)
    } else {
        tenths / 10f64.powi(-shift)
    }
}

/// IEC 60063 preferred number series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ESeries {
    E3,
    E6,
    E12,
    E24,
}

impl ESeries {
    pub fn mantissas(&self) -> &'static [f64] {
        match self {
            Self::E3 => &[1.0, 2.2, 4.7],
            Self::E6 => &[1.0, 1.5, 2.2, 3.3, 4.7, 6.8],
            Self::E12 => &[1.0, 1.2, 1.5, 1.8, 2.2, 2.7, 3.3, 3.9, 4.7, 5.6, 6.8, 8.2],
            Self::E24 => &[
                1.0, 1.1, 1.2, 1.3, 1.5, 1.6, 1.8, 2.0, 2.2, 2.4, 2.7, 3.0, 3.3, 3.6, 3.9, 4.3,
                4.7, 5.1, 5.6, 6.2, 6.8, 7.5, 8.2, 9.1,
            ],
        }
    }

    /// Ascending values of the series across `10^min_exp ..= 10^max_exp`.
    pub fn decades(&self, min_exp: i32, max_exp: i32) -> Vec<f64> {
        (min_exp..=max_exp)
            .flat_map(|exp| self.mantissas().iter().map(move |m| decade_value(*m, exp)))
            .collect()
    }
}

impl FromStr for ESeries {
    type Err = TfError;

    fn from_str(s: &str) -> TfResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "E3" => Ok(Self::E3),
            "E6" => Ok(Self::E6),
            "E12" => Ok(Self::E12),
            "E24" => Ok(Self::E24),
            _ => Err(TfError::Parse {
                input: s.to_string(),
                message: "expected one of E3, E6, E12, E24".to_string(),
            }),
        }
    }
}

impl fmt::Display for ESeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A resistor set and a capacitor set to pick parts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    pub resistors: ComponentSet,
    pub capacitors: ComponentSet,
}

impl Catalog {
    pub fn new(name: impl Into<String>, resistors: ComponentSet, capacitors: ComponentSet) -> TfResult<Self> {
        let catalog = Self {
            name: name.into(),
            resistors,
            capacitors,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// E12 resistors from 10Ω to 8.2MΩ and E6 capacitors from 1pF to 680µF.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            resistors: ComponentSet {
                unit: Unit::Ohm,
                values: ESeries::E12.decades(1, 6),
            },
            capacitors: ComponentSet {
                unit: Unit::Farad,
                values: ESeries::E6.decades(-12, -4),
            },
        }
    }

    /// Build a catalog from E-series over the given decade spans.
    pub fn from_series(
        resistor_series: ESeries,
        resistor_decades: (i32, i32),
        capacitor_series: ESeries,
        capacitor_decades: (i32, i32),
    ) -> TfResult<Self> {
        Self::new(
            format!("{resistor_series}/{capacitor_series}"),
            ComponentSet::e_series(
                resistor_series,
                Unit::Ohm,
                resistor_decades.0,
                resistor_decades.1,
            )?,
            ComponentSet::e_series(
                capacitor_series,
                Unit::Farad,
                capacitor_decades.0,
                capacitor_decades.1,
            )?,
        )
    }

    pub fn validate(&self) -> TfResult<()> {
        if self.resistors.unit() != Unit::Ohm {
            return Err(component_set_error!("resistor set is in {}", self.resistors.unit()));
        }
        if self.capacitors.unit() != Unit::Farad {
            return Err(component_set_error!("capacitor set is in {}", self.capacitors.unit()));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> TfResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> TfResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of (R1, R2, C) combinations an exhaustive search visits.
    pub fn combinations(&self) -> usize {
        self.resistors.len() * self.resistors.len() * self.capacitors.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
