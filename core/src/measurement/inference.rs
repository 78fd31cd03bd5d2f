//! Unit inference by evaluating an expression over quantities.
//!
//! Every variable is replaced by one of its unit, numbers stay plain
//! scalars, and the arithmetic of [`Quantity`] decides the result. The
//! magnitude that comes out is meaningless and only the unit is kept.
//! Exponents are taken from the numeric evaluation with the real values.
//!
//! Sums convert the right operand into the unit of the left one and trig
//! functions read their argument in radians. When any such conversion is
//! not the identity, [`Inferred::rescaled`] is set: substituting the raw
//! magnitudes of the inputs would then not produce a value in the
//! inferred unit.

use super::error::{MeasureError, MeasureResult};
use crate::algebra::{BinaryOperator, Expr, Function, Substitution, UnaryOperator, Var};
use crate::units::{Dimension, Quantity, Unit, UnitError};
use std::collections::HashMap;

/// Units bound to the value variables of an expression.
pub type UnitBindings = HashMap<Var, Unit>;

#[derive(Debug, Clone, PartialEq)]
pub struct Inferred {
    pub unit: Unit,
    /// An operand had to be converted by a factor other than one
    pub rescaled: bool,
}

/// The unit `expr` produces for inputs of the given units.
pub fn infer_unit(expr: &Expr, units: &UnitBindings, values: &Substitution) -> MeasureResult<Unit> {
    infer(expr, units, values).map(|inferred| inferred.unit)
}

/// Like [`infer_unit`], also reporting whether operands were rescaled.
pub fn infer(expr: &Expr, units: &UnitBindings, values: &Substitution) -> MeasureResult<Inferred> {
    let mut walk = Walk {
        units,
        values,
        rescaled: false,
    };
    let unit = walk.quantity(expr)?.unit;
    Ok(Inferred {
        unit,
        rescaled: walk.rescaled,
    })
}

struct Walk<'a> {
    units: &'a UnitBindings,
    values: &'a Substitution,
    rescaled: bool,
}

impl Walk<'_> {
    /// Record a conversion of `from` into `to`.
    fn convert(&mut self, from: &Unit, to: &Unit) -> Result<(), UnitError> {
        let factor = from.conversion_factor(to)?;
        if (factor - 1.0).abs() > f64::EPSILON {
            self.rescaled = true;
        }
        Ok(())
    }

    fn dimensionless(&mut self, q: &Quantity) -> Result<f64, UnitError> {
        let value = q.dimensionless_value()?;
        self.convert(&q.unit, &Unit::dimensionless())?;
        Ok(value)
    }

    fn radians(&mut self, q: &Quantity) -> Result<f64, UnitError> {
        let value = q.radians()?;
        let target = if q.unit.dimension() == Dimension::ANGLE {
            Unit::radian()
        } else {
            Unit::dimensionless()
        };
        self.convert(&q.unit, &target)?;
        Ok(value)
    }

    fn quantity(&mut self, expr: &Expr) -> MeasureResult<Quantity> {
        match expr {
            Expr::Number(n) => Ok(Quantity::dimensionless(*n)),

            Expr::Constant(c) => Ok(Quantity::dimensionless(c.value())),

            Expr::Var(var) => self
                .units
                .get(var)
                .map(|unit| Quantity::new(1.0, unit.clone()))
                .ok_or_else(|| MeasureError::UndefinedVariable(var.to_string())),

            Expr::BinaryOp { op, left, right } => {
                let l = self.quantity(left)?;
                let r = self.quantity(right)?;
                match op {
                    BinaryOperator::Add | BinaryOperator::Sub => {
                        self.convert(&r.unit, &l.unit)?;
                        let sum = match op {
                            BinaryOperator::Add => l.checked_add(&r)?,
                            _ => l.checked_sub(&r)?,
                        };
                        Ok(sum)
                    }
                    BinaryOperator::Mul => Ok(l.checked_mul(&r)?),
                    BinaryOperator::Div => Ok(l.checked_div(&r)?),
                    BinaryOperator::Pow => {
                        // the exponent must not carry a unit of its own
                        self.dimensionless(&r)?;
                        let exponent = right.eval(self.values)?;
                        Ok(l.powf(exponent)?)
                    }
                }
            }

            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => Ok(-self.quantity(operand)?),

            Expr::FnCall { func, arg } => {
                let q = self.quantity(arg)?;
                self.apply(*func, q)
            }
        }
    }

    fn apply(&mut self, func: Function, q: Quantity) -> MeasureResult<Quantity> {
        let plain = |f: fn(f64) -> f64, v: f64| Quantity::dimensionless(f(v));
        let angle = |f: fn(f64) -> f64, v: f64| Quantity::new(f(v), Unit::radian());

        Ok(match func {
            Function::Sin => plain(f64::sin, self.radians(&q)?),
            Function::Cos => plain(f64::cos, self.radians(&q)?),
            Function::Tan => plain(f64::tan, self.radians(&q)?),
            Function::Asin => angle(f64::asin, self.dimensionless(&q)?),
            Function::Acos => angle(f64::acos, self.dimensionless(&q)?),
            Function::Atan => angle(f64::atan, self.dimensionless(&q)?),
            Function::Sinh => plain(f64::sinh, self.dimensionless(&q)?),
            Function::Cosh => plain(f64::cosh, self.dimensionless(&q)?),
            Function::Tanh => plain(f64::tanh, self.dimensionless(&q)?),
            Function::Exp => plain(f64::exp, self.dimensionless(&q)?),
            Function::Ln => plain(f64::ln, self.dimensionless(&q)?),
            Function::Log10 => plain(f64::log10, self.dimensionless(&q)?),
            Function::Sqrt => q.powf(0.5)?,
            Function::Abs => Quantity::new(q.value.abs(), q.unit),
            Function::Sign => Quantity::dimensionless(q.value.signum()),
        })
    }
}
