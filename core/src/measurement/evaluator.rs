//! Evaluation of expressions over measured inputs.

use super::error::{MeasureError, MeasureResult};
use super::formula::error_formula_for;
use super::inference::{infer, infer_unit, UnitBindings};
use super::types::{Input, MeasuredValue};
use crate::algebra::{parse_expression, Substitution, Symbol};
use crate::units::Unit;
use std::collections::BTreeMap;
use tracing::debug;

/// Builder for one evaluation of an expression.
///
/// ```ignore
/// let g = Evaluation::new("(1/m)*(d/D)")
///     .input("m", magnification)
///     .input("d", d)
///     .input("D", big_d)
///     .dimensionless_fallback(Unit::radian())
///     .evaluate()?;
/// ```
#[derive(Debug, Clone)]
pub struct Evaluation {
    expression: String,
    inputs: BTreeMap<String, Input>,
    name: Option<String>,
    symbol: Option<Symbol>,
    fallback: Unit,
}

impl Evaluation {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            inputs: BTreeMap::new(),
            name: None,
            symbol: None,
            fallback: Unit::dimensionless(),
        }
    }

    /// Bind a variable name. A later binding of the same name wins.
    pub fn input(mut self, name: impl Into<String>, input: impl Into<Input>) -> Self {
        self.inputs.insert(name.into(), input.into());
        self
    }

    pub fn inputs<I, K, V>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Input>,
    {
        self.inputs
            .extend(inputs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Unit to report when the inferred unit is plain dimensionless.
    pub fn dimensionless_fallback(mut self, unit: Unit) -> Self {
        self.fallback = unit;
        self
    }

    pub fn evaluate(&self) -> MeasureResult<MeasuredValue> {
        let span = tracing::debug_span!("evaluate", expression = %self.expression);
        let _enter = span.enter();

        let expr = parse_expression(&self.expression)?;
        let error_expr = error_formula_for(&expr);

        // raw magnitudes, and the same inputs in SI base units
        let mut values = Substitution::new();
        let mut units = UnitBindings::new();
        let mut si_values = Substitution::new();
        let mut si_units = UnitBindings::new();
        for var in expr.free_symbols() {
            let name = var.symbol().name();
            let measured = self
                .inputs
                .get(name)
                .cloned()
                .map(Input::into_measured)
                .ok_or_else(|| MeasureError::UndefinedVariable(name.to_string()))?;
            let si = measured.to_si()?;

            units.insert(var.clone(), measured.unit()?.clone());
            si_units.insert(var.clone(), si.unit()?.clone());
            values.insert(var.error_companion(), measured.error_as_number());
            si_values.insert(var.error_companion(), si.error_as_number());
            values.insert(var.clone(), measured.as_number());
            si_values.insert(var, si.as_number());
        }

        let inferred = infer(&expr, &units, &values)?;
        let (value, error, mut unit) = if inferred.rescaled {
            // Mixed scales: evaluate where every factor is one, then
            // express the result in the inferred unit.
            let unit = infer(&expr, &units, &si_values)?.unit;
            let si_unit = infer_unit(&expr, &si_units, &si_values)?;
            let factor = si_unit.conversion_factor(&unit)?;
            debug!(si_unit = %si_unit, factor, "rescaled to SI");
            (
                expr.eval(&si_values)? * factor,
                error_expr.eval(&si_values)? * factor,
                unit,
            )
        } else {
            (expr.eval(&values)?, error_expr.eval(&values)?, inferred.unit)
        };

        if unit.is_dimensionless() {
            unit = self.fallback.clone();
        }
        debug!(value, error, unit = %unit, "evaluated");

        let mut result = MeasuredValue::derived(value, error, unit, error_expr);
        if let Some(name) = &self.name {
            result.set_name(name.clone());
        }
        if let Some(symbol) = &self.symbol {
            result = result.with_symbol(symbol.clone());
        }
        Ok(result)
    }
}

/// Evaluate `expression` with default options.
pub fn evaluate<I, K, V>(expression: &str, inputs: I) -> MeasureResult<MeasuredValue>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Input>,
{
    Evaluation::new(expression).inputs(inputs).evaluate()
}
