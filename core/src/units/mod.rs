//! Physical units and unit-tagged quantities.
//!
//! A [`Unit`] is a product of [`NamedUnit`]s raised to integer powers.
//! Identical named units cancel, different units of the same dimension do
//! not: `mm / mm` is dimensionless, `mm / cm` is a scaled ratio.
//!
//! Unit arithmetic is fallible: exponents are bounded by [`MAX_EXPONENT`].

mod quantity;


pub use quantity::Quantity;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;
use thiserror::Error;

/// Largest magnitude a unit exponent may reach.
pub const MAX_EXPONENT: i32 = 1 << 16;

/// Errors raised by unit arithmetic and conversion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("Incompatible units: cannot convert '{from}' to '{to}'")]
    Incompatible { from: String, to: String },

    #[error("Cannot raise '{unit}' to the power {exponent}")]
    FractionalPower { unit: String, exponent: f64 },

    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    #[error("Invalid unit string: '{0}'")]
    InvalidUnitString(String),

    #[error("Exponent {exponent} of '{unit}' is out of range")]
    ExponentOutOfRange { unit: String, exponent: f64 },
}

fn bounded_exponent(unit: NamedUnit, exponent: i64) -> Result<i32, UnitError> {
    if exponent.abs() > i64::from(MAX_EXPONENT) {
        return Err(UnitError::ExponentOutOfRange {
            unit: unit.to_string(),
            exponent: exponent as f64,
        });
    }
    Ok(exponent as i32)
}

/// Exponents of the base dimensions.
///
/// Angle is tracked as its own dimension, so a radian is not dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub length: i32,
    pub mass: i32,
    pub time: i32,
    pub current: i32,
    pub temperature: i32,
    pub angle: i32,
}

impl Dimension {
    pub const NONE: Self = Self::new(0, 0, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(1, 0, 0, 0, 0, 0);
    pub const MASS: Self = Self::new(0, 1, 0, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0, 0);
    pub const CURRENT: Self = Self::new(0, 0, 0, 1, 0, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 0, 1, 0);
    pub const ANGLE: Self = Self::new(0, 0, 0, 0, 0, 1);

    const fn new(length: i32, mass: i32, time: i32, current: i32, temperature: i32, angle: i32) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature,
            angle,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn powi(self, n: i32) -> Self {
        Self::new(
            self.length * n,
            self.mass * n,
            self.time * n,
            self.current * n,
            self.temperature * n,
            self.angle * n,
        )
    }
}

impl Mul for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.length + rhs.length,
            self.mass + rhs.mass,
            self.time + rhs.time,
            self.current + rhs.current,
            self.temperature + rhs.temperature,
            self.angle + rhs.angle,
        )
    }
}

impl Div for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.powi(-1)
    }
}

/// The catalogue of units a [`Unit`] can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NamedUnit {
    // Length
    Meter,
    Kilometer,
    Centimeter,
    Millimeter,
    Micrometer,
    Nanometer,
    AstronomicalUnit,
    LightYear,
    Parsec,
    Inch,
    Foot,
    // Mass
    Gram,
    Kilogram,
    // Time
    Second,
    Minute,
    Hour,
    Day,
    Year,
    // Angle
    Radian,
    Degree,
    Arcminute,
    Arcsecond,
    // Electric current, temperature
    Ampere,
    Kelvin,
    // Derived
    Hertz,
    Newton,
    Joule,
    Watt,
    Pascal,
    Volt,
}

impl NamedUnit {
    pub const ALL: [NamedUnit; 30] = [
        Self::Meter,
        Self::Kilometer,
        Self::Centimeter,
        Self::Millimeter,
        Self::Micrometer,
        Self::Nanometer,
        Self::AstronomicalUnit,
        Self::LightYear,
        Self::Parsec,
        Self::Inch,
        Self::Foot,
        Self::Gram,
        Self::Kilogram,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Year,
        Self::Radian,
        Self::Degree,
        Self::Arcminute,
        Self::Arcsecond,
        Self::Ampere,
        Self::Kelvin,
        Self::Hertz,
        Self::Newton,
        Self::Joule,
        Self::Watt,
        Self::Pascal,
        Self::Volt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Meter => "m",
            Self::Kilometer => "km",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Micrometer => "um",
            Self::Nanometer => "nm",
            Self::AstronomicalUnit => "AU",
            Self::LightYear => "lyr",
            Self::Parsec => "pc",
            Self::Inch => "in",
            Self::Foot => "ft",
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Second => "s",
            Self::Minute => "min",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Year => "yr",
            Self::Radian => "rad",
            Self::Degree => "deg",
            Self::Arcminute => "arcmin",
            Self::Arcsecond => "arcsec",
            Self::Ampere => "A",
            Self::Kelvin => "K",
            Self::Hertz => "Hz",
            Self::Newton => "N",
            Self::Joule => "J",
            Self::Watt => "W",
            Self::Pascal => "Pa",
            Self::Volt => "V",
        }
    }

    /// Size of one of this unit in SI base units (radian for angles).
    pub fn scale(&self) -> f64 {
        use std::f64::consts::PI;
        match self {
            Self::Meter => 1.0,
            Self::Kilometer => 1e3,
            Self::Centimeter => 1e-2,
            Self::Millimeter => 1e-3,
            Self::Micrometer => 1e-6,
            Self::Nanometer => 1e-9,
            Self::AstronomicalUnit => 1.495_978_707e11,
            Self::LightYear => 9.460_730_472_580_8e15,
            Self::Parsec => 3.085_677_581_491_367_3e16,
            Self::Inch => 0.0254,
            Self::Foot => 0.3048,
            Self::Gram => 1e-3,
            Self::Kilogram => 1.0,
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3600.0,
            Self::Day => 86_400.0,
            // Julian year
            Self::Year => 31_557_600.0,
            Self::Radian => 1.0,
            Self::Degree => PI / 180.0,
            Self::Arcminute => PI / 10_800.0,
            Self::Arcsecond => PI / 648_000.0,
            Self::Ampere | Self::Kelvin | Self::Hertz => 1.0,
            Self::Newton | Self::Joule | Self::Watt | Self::Pascal | Self::Volt => 1.0,
        }
    }

    pub fn dimension(&self) -> Dimension {
        use Dimension as D;
        match self {
            Self::Meter
            | Self::Kilometer
            | Self::Centimeter
            | Self::Millimeter
            | Self::Micrometer
            | Self::Nanometer
            | Self::AstronomicalUnit
            | Self::LightYear
            | Self::Parsec
            | Self::Inch
            | Self::Foot => D::LENGTH,
            Self::Gram | Self::Kilogram => D::MASS,
            Self::Second | Self::Minute | Self::Hour | Self::Day | Self::Year => D::TIME,
            Self::Radian | Self::Degree | Self::Arcminute | Self::Arcsecond => D::ANGLE,
            Self::Ampere => D::CURRENT,
            Self::Kelvin => D::TEMPERATURE,
            Self::Hertz => D::NONE / D::TIME,
            Self::Newton => D::MASS * D::LENGTH / D::TIME.powi(2),
            Self::Joule => D::MASS * D::LENGTH.powi(2) / D::TIME.powi(2),
            Self::Watt => D::MASS * D::LENGTH.powi(2) / D::TIME.powi(3),
            Self::Pascal => D::MASS / D::LENGTH / D::TIME.powi(2),
            Self::Volt => D::MASS * D::LENGTH.powi(2) / D::TIME.powi(3) / D::CURRENT,
        }
    }
}

impl fmt::Display for NamedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for NamedUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "µm" | "micron" => return Ok(Self::Micrometer),
            "au" => return Ok(Self::AstronomicalUnit),
            "ly" => return Ok(Self::LightYear),
            "sec" => return Ok(Self::Second),
            "hr" => return Ok(Self::Hour),
            "day" => return Ok(Self::Day),
            "°" => return Ok(Self::Degree),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.symbol() == s)
            .ok_or_else(|| UnitError::UnknownUnit(s.to_string()))
    }
}

/// A product of named units with non-zero integer exponents.
///
/// The empty product is the canonical dimensionless unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Unit {
    factors: BTreeMap<NamedUnit, i32>,
}

impl Unit {
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn radian() -> Self {
        NamedUnit::Radian.into()
    }

    /// True only for the canonical unitless unit, not for scaled ratios
    /// such as `mm / cm`.
    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = (NamedUnit, i32)> + '_ {
        self.factors.iter().map(|(unit, exp)| (*unit, *exp))
    }

    pub fn powi(&self, n: i32) -> Result<Self, UnitError> {
        if n == 0 {
            return Ok(Self::dimensionless());
        }
        let factors = self
            .factors
            .iter()
            .map(|(unit, exp)| Ok((*unit, bounded_exponent(*unit, i64::from(*exp) * i64::from(n))?)))
            .collect::<Result<BTreeMap<_, _>, UnitError>>()?;
        Ok(Self { factors })
    }

    /// Raise to a real power. Fails unless every exponent stays integral.
    pub fn powf(&self, exponent: f64) -> Result<Self, UnitError> {
        if self.is_dimensionless() {
            return Ok(Self::dimensionless());
        }
        let fractional = || UnitError::FractionalPower {
            unit: self.to_string(),
            exponent,
        };
        if !exponent.is_finite() {
            return Err(fractional());
        }
        let mut factors = BTreeMap::new();
        for (unit, exp) in &self.factors {
            let raised = *exp as f64 * exponent;
            if (raised - raised.round()).abs() > 1e-9 {
                return Err(fractional());
            }
            if raised.abs() > f64::from(MAX_EXPONENT) {
                return Err(UnitError::ExponentOutOfRange {
                    unit: unit.to_string(),
                    exponent: raised,
                });
            }
            let raised = raised.round() as i32;
            if raised != 0 {
                factors.insert(*unit, raised);
            }
        }
        Ok(Self { factors })
    }

    pub fn dimension(&self) -> Dimension {
        self.factors
            .iter()
            .fold(Dimension::NONE, |acc, (unit, exp)| acc * unit.dimension().powi(*exp))
    }

    /// Size of this unit in SI base units.
    pub fn si_scale(&self) -> f64 {
        self.factors
            .iter()
            .map(|(unit, exp)| unit.scale().powi(*exp))
            .product()
    }

    /// Check if two units measure the same dimension
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dimension() == other.dimension()
    }

    /// Factor that turns a magnitude in `self` into a magnitude in `to`.
    pub fn conversion_factor(&self, to: &Unit) -> Result<f64, UnitError> {
        if self == to {
            return Ok(1.0);
        }
        if !self.is_compatible(to) {
            return Err(UnitError::Incompatible {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        Ok(self.si_scale() / to.si_scale())
    }

    /// The SI base-unit product with the same dimension.
    pub fn to_si(&self) -> Unit {
        let dim = self.dimension();
        let factors = [
            (NamedUnit::Meter, dim.length),
            (NamedUnit::Kilogram, dim.mass),
            (NamedUnit::Second, dim.time),
            (NamedUnit::Ampere, dim.current),
            (NamedUnit::Kelvin, dim.temperature),
            (NamedUnit::Radian, dim.angle),
        ]
        .into_iter()
        .filter(|(_, exp)| *exp != 0)
        .collect();
        Unit { factors }
    }

    pub fn checked_mul(&self, other: &Unit) -> Result<Unit, UnitError> {
        self.clone().merge(other, 1)
    }

    pub fn checked_div(&self, other: &Unit) -> Result<Unit, UnitError> {
        self.clone().merge(other, -1)
    }

    fn merge(mut self, other: &Unit, sign: i64) -> Result<Unit, UnitError> {
        for (unit, exp) in &other.factors {
            let current = self.factors.get(unit).copied().unwrap_or(0);
            let merged = bounded_exponent(*unit, i64::from(current) + sign * i64::from(*exp))?;
            if merged == 0 {
                self.factors.remove(unit);
            } else {
                self.factors.insert(*unit, merged);
            }
        }
        Ok(self)
    }
}

impl From<NamedUnit> for Unit {
    fn from(unit: NamedUnit) -> Self {
        Self {
            factors: BTreeMap::from([(unit, 1)]),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn term(unit: NamedUnit, exp: i32) -> String {
            if exp == 1 {
                unit.symbol().to_string()
            } else {
                format!("{}^{}", unit.symbol(), exp)
            }
        }
        let num: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, exp)| **exp > 0)
            .map(|(unit, exp)| term(*unit, *exp))
            .collect();
        let den: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, exp)| **exp < 0)
            .map(|(unit, exp)| term(*unit, -exp))
            .collect();
        let den_str = if den.len() > 1 {
            format!("({})", den.join(" "))
        } else {
            den.join(" ")
        };

        match (num.is_empty(), den.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => write!(f, "{}", num.join(" ")),
            (true, false) => write!(f, "1 / {}", den_str),
            (false, false) => write!(f, "{} / {}", num.join(" "), den_str),
        }
    }
}

/// Parse a space, `*` or `·` separated product like "kg m^2"
fn gather_units(list: &str, whole: &str) -> Result<Unit, UnitError> {
    let list = list.trim();
    let list = list
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(list);
    if list.trim() == "1" {
        return Ok(Unit::dimensionless());
    }

    let mut acc = Unit::dimensionless();
    for token in list
        .split(|c: char| c.is_whitespace() || c == '*' || c == '·')
        .filter(|t| !t.is_empty())
    {
        let (symbol, exp) = match token.split_once('^') {
            Some((symbol, exp)) => {
                let exp = exp
                    .trim_start_matches('(')
                    .trim_end_matches(')')
                    .parse::<i32>()
                    .map_err(|_| UnitError::InvalidUnitString(whole.to_string()))?;
                (symbol, exp)
            }
            None => (token, 1),
        };
        let unit: Unit = symbol.parse::<NamedUnit>()?.into();
        acc = acc.checked_mul(&unit.powi(exp)?)?;
    }
    Ok(acc)
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Unit::dimensionless());
        }
        match s.split_once('/') {
            None => gather_units(s, s),
            Some((num, den)) => {
                if den.contains('/') || den.trim().is_empty() {
                    return Err(UnitError::InvalidUnitString(s.to_string()));
                }
                let num = if num.trim().is_empty() {
                    Unit::dimensionless()
                } else {
                    gather_units(num, s)?
                };
                Ok(num.checked_div(&gather_units(den, s)?)?)
            }
        }
    }
}

impl Serialize for Unit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
