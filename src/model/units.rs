//! Eenheidsconversie tussen inches en centimeters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Linear unit a [`DimensionParameters`](super::DimensionParameters) set is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Inches,
    Centimeters,
}

impl LengthUnit {
    /// Length of one unit in centimeters.
    #[must_use]
    pub const fn centimeters(self) -> f64 {
        match self {
            Self::Inches => CM_PER_INCH,
            Self::Centimeters => 1.0,
        }
    }

    /// Factor that turns a value in this unit into meters (inches: 0.0254).
    #[must_use]
    pub fn meters_per_unit(self) -> f64 {
        self.centimeters() / 100.0
    }

    /// Short suffix used in readouts and drawing labels.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Inches => "\"",
            Self::Centimeters => " cm",
        }
    }

    /// Formats `value` with at most two decimals and the unit suffix.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        format!("{}{}", format_number(value), self.suffix())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inches => "inches",
            Self::Centimeters => "centimeters",
        })
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => Ok(Self::Inches),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(Self::Centimeters)
            }
            other => Err(format!("onbekende eenheid `{other}`")),
        }
    }
}

/// Converts `value` from `from` to `to`. Same-unit conversion is the identity.
#[must_use]
pub fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    if from == to {
        return value;
    }
    value * from.centimeters() / to.centimeters()
}

/// Converts a working-unit length to meters.
#[must_use]
pub fn to_meters(value: f64, unit: LengthUnit) -> f64 {
    value * unit.meters_per_unit()
}

/// Rounds to two decimals and strips trailing zeros (`50.80` → `50.8`).
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    #[test]
    fn inches_to_centimeters_uses_fixed_factor() {
        assert!((convert(20.0, LengthUnit::Inches, LengthUnit::Centimeters) - 50.8).abs() < 1e-12);
        assert!((convert(2.54, LengthUnit::Centimeters, LengthUnit::Inches) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn same_unit_is_identity() {
        let x = 17.123_456_789;
        assert_eq!(convert(x, LengthUnit::Inches, LengthUnit::Inches), x);
        assert_eq!(convert(x, LengthUnit::Centimeters, LengthUnit::Centimeters), x);
    }

    #[test]
    fn round_trip_is_within_relative_tolerance() {
        for x in [1e-6, 0.75, 20.0, 96.0, 12_345.678] {
            let back = convert(
                convert(x, LengthUnit::Inches, LengthUnit::Centimeters),
                LengthUnit::Centimeters,
                LengthUnit::Inches,
            );
            assert!(Tolerance::DEFAULT.approx_eq_relative(back, x), "{x} -> {back}");
        }
    }

    #[test]
    fn meters_factor_matches_unit() {
        assert!((to_meters(20.0, LengthUnit::Inches) - 0.508).abs() < 1e-12);
        assert!((to_meters(50.8, LengthUnit::Centimeters) - 0.508).abs() < 1e-12);
    }

    #[test]
    fn formats_readouts() {
        assert_eq!(LengthUnit::Inches.format(20.0), "20\"");
        assert_eq!(LengthUnit::Centimeters.format(50.8), "50.8 cm");
        assert_eq!(LengthUnit::Inches.format(0.75), "0.75\"");
        assert_eq!(format_number(-0.001), "0");
    }

    #[test]
    fn parses_unit_names() {
        assert_eq!("Inches".parse::<LengthUnit>(), Ok(LengthUnit::Inches));
        assert_eq!(" cm ".parse::<LengthUnit>(), Ok(LengthUnit::Centimeters));
        assert!("furlong".parse::<LengthUnit>().is_err());
    }
}
