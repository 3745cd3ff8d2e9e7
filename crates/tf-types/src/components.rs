use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{TfError, TfResult};

/// Physical unit carried by a component value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Ohm,
    Farad,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Ohm => "Ω",
            Self::Farad => "F",
        }
    }

    /// Lowest value a component of this unit may take.
    ///
    /// Resistors may be zero (R2 = 0 still gives a valid circuit); capacitors
    /// must be strictly positive or the period collapses.
    pub fn validate(&self, value: f64) -> TfResult<()> {
        if !value.is_finite() {
            return Err(TfError::InvalidComponentValue {
                message: format!("{value} is not a finite {} value", self.quantity()),
            });
        }
        match self {
            Self::Ohm if value < 0.0 => Err(TfError::InvalidComponentValue {
                message: format!("resistance must be non-negative, got {value}"),
            }),
            Self::Farad if value <= 0.0 => Err(TfError::DegenerateCircuit {
                message: format!("capacitance must be positive, got {value}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn quantity(&self) -> &'static str {
        match self {
            Self::Ohm => "resistance",
            Self::Farad => "capacitance",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A validated, unit-tagged component value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentValue {
    pub value: f64,
    pub unit: Unit,
}

impl ComponentValue {
    pub fn new(value: f64, unit: Unit) -> TfResult<Self> {
        unit.validate(value)?;
        Ok(Self { value, unit })
    }

    pub fn ohms(value: f64) -> TfResult<Self> {
        Self::new(value, Unit::Ohm)
    }

    pub fn farads(value: f64) -> TfResult<Self> {
        Self::new(value, Unit::Farad)
    }

    /// Parse a value such as `4.7k`, `100nF` or `1e-6` for the given unit.
    pub fn parse(input: &str, unit: Unit) -> TfResult<Self> {
        Self::new(parse_si(input)?, unit)
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_si(self.value, self.unit.symbol()))
    }
}

const PREFIXES: &[(f64, &str)] = &[
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1e0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
    (1e-9, "n"),
    (1e-12, "p"),
    (1e-15, "f"),
];

/// Format a value in engineering notation with an SI prefix, e.g. `4.7kΩ`.
pub fn format_si(value: f64, symbol: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}{symbol}");
    }

    let magnitude = value.abs();
    // Tolerate float fuzz such as 4.7 * 1e-9 landing just below a decade boundary.
    let mut index = PREFIXES
        .iter()
        .position(|(scale, _)| magnitude >= scale * (1.0 - 1e-9))
        .unwrap_or(PREFIXES.len() - 1);
    // 999.9996 rounds to 1000.000 at three decimals; carry into the next prefix.
    if index > 0 && (value / PREFIXES[index].0 * 1e3).round().abs() >= 1e6 {
        index -= 1;
    }
    let (scale, prefix) = PREFIXES[index];

    let mantissa = format!("{:.3}", value / scale);
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    format!("{mantissa}{prefix}{symbol}")
}

/// Parse a number with an optional SI prefix and unit symbol.
///
/// Accepts `4.7k`, `4.7kΩ`, `100n`, `100nF`, `10ms`, `2.2M` and plain floats
/// such as `1e-6`. `m` is milli and `M` is mega.
pub fn parse_si(input: &str) -> TfResult<f64> {
    let parse_error = |message: &str| TfError::Parse {
        input: input.to_string(),
        message: message.to_string(),
    };

    let mut body = input.trim();
    for symbol in ["ohms", "ohm", "Ω", "F", "s"] {
        if let Some(stripped) = body.strip_suffix(symbol) {
            body = stripped.trim_end();
            break;
        }
    }

    let (number, multiplier) = match body.chars().last() {
        Some(last) if !last.is_ascii_digit() && last != '.' => {
            let multiplier = match last {
                'T' => 1e12,
                'G' => 1e9,
                'M' => 1e6,
                'k' | 'K' => 1e3,
                'm' => 1e-3,
                'u' | 'µ' => 1e-6,
                'n' => 1e-9,
                'p' => 1e-12,
                'f' => 1e-15,
                _ => return Err(parse_error("unknown SI prefix")),
            };
            (&body[..body.len() - last.len_utf8()], multiplier)
        }
        Some(_) => (body, 1.0),
        None => return Err(parse_error("empty value")),
    };

    let number: f64 = number
        .trim()
        .parse()
        .map_err(|_| parse_error("not a number"))?;
    let value = number * multiplier;
    if !value.is_finite() {
        return Err(parse_error("value is not finite"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_validation() {
        assert!(Unit::Ohm.validate(0.0).is_ok());
        assert!(matches!(
            Unit::Ohm.validate(-1.0),
            Err(TfError::InvalidComponentValue { .. })
        ));
        assert!(matches!(
            Unit::Farad.validate(0.0),
            Err(TfError::DegenerateCircuit { .. })
        ));
        assert!(Unit::Farad.validate(f64::NAN).is_err());
        assert!(Unit::Ohm.validate(f64::INFINITY).is_err());
    }

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(4700.0, "Ω"), "4.7kΩ");
        assert_eq!(format_si(100e-9, "F"), "100nF");
        assert_eq!(format_si(4.7e-9, "F"), "4.7nF");
        assert_eq!(format_si(1.0e6, "Ω"), "1MΩ");
        assert_eq!(format_si(0.01, "s"), "10ms");
        assert_eq!(format_si(42.0, "s"), "42s");
        assert_eq!(format_si(0.0, "Ω"), "0Ω");
    }

    #[test]
    fn test_format_si_carries_rounding_into_next_prefix() {
        assert_eq!(format_si(999.9996, "Ω"), "1kΩ");
        assert_eq!(format_si(-999.9996, "Ω"), "-1kΩ");
        assert_eq!(format_si(999_999.7, "Ω"), "1MΩ");
        assert_eq!(format_si(999.9994, "Ω"), "999.999Ω");
        assert_eq!(format_si(0.99999999, "s"), "1s");
    }

    #[test]
    fn test_parse_si() {
        assert_eq!(parse_si("4.7k").unwrap(), 4700.0);
        assert_eq!(parse_si("4.7kΩ").unwrap(), 4700.0);
        assert!((parse_si("100nF").unwrap() - 100e-9).abs() < 1e-18);
        assert!((parse_si("10ms").unwrap() - 0.01).abs() < 1e-15);
        assert_eq!(parse_si("2.2M").unwrap(), 2.2e6);
        assert_eq!(parse_si("1e-6").unwrap(), 1e-6);
        assert_eq!(parse_si(" 42 ").unwrap(), 42.0);
        assert!((parse_si("1µ").unwrap() - 1e-6).abs() < 1e-20);
    }

    #[test]
    fn test_parse_si_rejects_garbage() {
        assert!(matches!(parse_si(""), Err(TfError::Parse { .. })));
        assert!(matches!(parse_si("abc"), Err(TfError::Parse { .. })));
        assert!(matches!(parse_si("4.7x"), Err(TfError::Parse { .. })));
        assert!(matches!(parse_si("k"), Err(TfError::Parse { .. })));
    }

    #[test]
    fn test_component_value_display() {
        let r = ComponentValue::ohms(10_000.0).unwrap();
        assert_eq!(r.to_string(), "10kΩ");

        let c = ComponentValue::parse("1u", Unit::Farad).unwrap();
        assert_eq!(c.unit, Unit::Farad);
        assert_eq!(c.to_string(), "1µF");

        assert!(ComponentValue::farads(0.0).is_err());
    }
}
