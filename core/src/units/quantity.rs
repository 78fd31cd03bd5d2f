//! A magnitude with a unit attached.

use super::{Dimension, Unit, UnitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Mul, Neg};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    /// Convert to another unit of the same dimension.
    pub fn to(&self, target: &Unit) -> Result<Quantity, UnitError> {
        let factor = self.unit.conversion_factor(target)?;
        Ok(Self::new(self.value * factor, target.clone()))
    }

    pub fn to_si(&self) -> Quantity {
        Self::new(self.value * self.unit.si_scale(), self.unit.to_si())
    }

    /// Add `rhs` after converting it into this quantity's unit.
    pub fn checked_add(&self, rhs: &Quantity) -> Result<Quantity, UnitError> {
        let rhs = rhs.to(&self.unit)?;
        Ok(Self::new(self.value + rhs.value, self.unit.clone()))
    }

    pub fn checked_sub(&self, rhs: &Quantity) -> Result<Quantity, UnitError> {
        let rhs = rhs.to(&self.unit)?;
        Ok(Self::new(self.value - rhs.value, self.unit.clone()))
    }

    pub fn checked_mul(&self, rhs: &Quantity) -> Result<Quantity, UnitError> {
        Ok(Self::new(self.value * rhs.value, self.unit.checked_mul(&rhs.unit)?))
    }

    pub fn checked_div(&self, rhs: &Quantity) -> Result<Quantity, UnitError> {
        Ok(Self::new(self.value / rhs.value, self.unit.checked_div(&rhs.unit)?))
    }

    pub fn powf(&self, exponent: f64) -> Result<Quantity, UnitError> {
        Ok(Self::new(self.value.powf(exponent), self.unit.powf(exponent)?))
    }

    /// Plain magnitude of a quantity whose unit carries no dimension
    /// (`mm / cm` becomes 0.1).
    pub fn dimensionless_value(&self) -> Result<f64, UnitError> {
        self.to(&Unit::dimensionless())
            .map(|q| q.value)
            .map_err(|_| UnitError::Incompatible {
                from: self.unit.to_string(),
                to: "dimensionless".to_string(),
            })
    }

    /// Magnitude in radians of an angle or a plain number.
    pub fn radians(&self) -> Result<f64, UnitError> {
        if self.unit.dimension() == Dimension::ANGLE {
            self.to(&Unit::radian()).map(|q| q.value)
        } else {
            self.dimensionless_value().map_err(|_| UnitError::Incompatible {
                from: self.unit.to_string(),
                to: Unit::radian().to_string(),
            })
        }
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;
    fn mul(self, rhs: f64) -> Self::Output {
        Quantity::new(self.value * rhs, self.unit)
    }
}

impl Neg for Quantity {
    type Output = Quantity;
    fn neg(self) -> Self::Output {
        Quantity::new(-self.value, self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}
