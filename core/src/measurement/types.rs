//! Measured values and evaluator inputs.

use super::error::{MeasureError, MeasureResult};
use crate::algebra::{Expr, Symbol};
use crate::units::{Quantity, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

/// Separator between a value and its uncertainty in rendered output.
pub const PLUS_MINUS: char = '±';

/// A value with an absolute uncertainty in a single unit.
///
/// Value, error and the declared unit are kept in agreement by
/// [`MeasuredValue::convert`]; parts handed to
/// [`MeasuredValue::from_quantities`] are only checked when the unit is
/// requested.
///
/// The serde form feeds the backend's live updates. It is not a storage or
/// exchange format and may change without notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredValue {
    value: Quantity,
    error: Quantity,
    unit: Unit,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Symbol,
    /// Uncertainty formula this value was derived with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_formula: Option<Expr>,
}

/// How [`MeasuredValue::combine`] joins two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombineOp {
    #[default]
    Multiply,
    Divide,
}

impl MeasuredValue {
    pub fn new(value: f64, error: f64, unit: Unit) -> Self {
        Self::from_quantities(
            Quantity::new(value, unit.clone()),
            Quantity::new(error, unit.clone()),
            unit,
        )
    }

    pub fn from_quantities(value: Quantity, error: Quantity, unit: Unit) -> Self {
        Self {
            value,
            error,
            unit,
            name: None,
            symbol: Symbol::placeholder(),
            error_formula: None,
        }
    }

    pub(crate) fn derived(value: f64, error: f64, unit: Unit, error_formula: Expr) -> Self {
        Self {
            error_formula: Some(error_formula),
            ..Self::new(value, error, unit)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn error_formula(&self) -> Option<&Expr> {
        self.error_formula.as_ref()
    }

    pub fn as_number(&self) -> f64 {
        self.value.value
    }

    pub fn as_quantity(&self) -> Quantity {
        self.value.clone()
    }

    pub fn error_as_number(&self) -> f64 {
        self.error.value
    }

    pub fn error_as_quantity(&self) -> Quantity {
        self.error.clone()
    }

    /// Fails unless value, error and declared unit are the same unit.
    pub fn check_units(&self) -> MeasureResult<()> {
        if self.value.unit == self.unit && self.error.unit == self.unit {
            Ok(())
        } else {
            Err(MeasureError::UnitMismatch {
                value: self.value.unit.to_string(),
                error: self.error.unit.to_string(),
                unit: self.unit.to_string(),
            })
        }
    }

    /// The declared unit, after a consistency check.
    pub fn unit(&self) -> MeasureResult<&Unit> {
        self.check_units()?;
        Ok(&self.unit)
    }

    /// Convert value, error and unit to `target` in one step.
    ///
    /// Nothing changes when the conversion fails.
    pub fn convert(&mut self, target: &Unit) -> MeasureResult<&mut Self> {
        let value = self.value.to(target)?;
        let error = self.error.to(target)?;
        self.value = value;
        self.error = error;
        self.unit = target.clone();
        self.check_units()?;
        Ok(self)
    }

    /// A copy expressed in SI base units.
    pub fn to_si(&self) -> MeasureResult<MeasuredValue> {
        let target = self.unit()?.to_si();
        let mut converted = self.clone();
        converted.convert(&target)?;
        Ok(converted)
    }

    /// Multiply or divide by another measurement using the relative-error
    /// sum `σ = result * (σl/l + σr/r)`.
    ///
    /// The right operand is converted into this value's unit first.
    /// Returns `Ok(None)` when `other` is not a measured value.
    pub fn combine(&self, other: &Input, op: CombineOp) -> MeasureResult<Option<MeasuredValue>> {
        let other = match other {
            Input::Measured(measured) => measured,
            Input::Constant(_) => return Ok(None),
        };

        let mut right = other.clone();
        right.convert(self.unit()?)?;

        let relative = self.error.value / self.value.value + right.error.value / right.value.value;
        let value = match op {
            CombineOp::Multiply => self.value.checked_mul(&right.value)?,
            CombineOp::Divide => self.value.checked_div(&right.value)?,
        };
        let error = value.clone() * relative;
        let unit = value.unit.clone();
        Ok(Some(MeasuredValue::from_quantities(value, error, unit)))
    }

    /// `name = (value ± error) unit`
    pub fn render(&self) -> String {
        let label = self.name.as_deref().unwrap_or(self.symbol.name());
        format!(
            "{} = ({} {} {}) {}",
            label, self.value.value, PLUS_MINUS, self.error.value, self.unit
        )
        .trim_end()
        .to_string()
    }
}

impl fmt::Display for MeasuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Mul for &MeasuredValue {
    type Output = MeasureResult<Option<MeasuredValue>>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.combine(&Input::Measured(rhs.clone()), CombineOp::Multiply)
    }
}

/// Something an expression variable can be bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    Measured(MeasuredValue),
    /// An exact quantity with no uncertainty
    Constant(Quantity),
}

impl Input {
    /// Constants become measurements with zero error.
    pub fn into_measured(self) -> MeasuredValue {
        match self {
            Input::Measured(measured) => measured,
            Input::Constant(quantity) => {
                MeasuredValue::new(quantity.value, 0.0, quantity.unit)
            }
        }
    }
}

impl From<MeasuredValue> for Input {
    fn from(value: MeasuredValue) -> Self {
        Input::Measured(value)
    }
}

impl From<&MeasuredValue> for Input {
    fn from(value: &MeasuredValue) -> Self {
        Input::Measured(value.clone())
    }
}

impl From<Quantity> for Input {
    fn from(quantity: Quantity) -> Self {
        Input::Constant(quantity)
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Input::Constant(Quantity::dimensionless(value))
    }
}
