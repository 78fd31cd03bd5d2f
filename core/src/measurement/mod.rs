//! Measurements with uncertainties and their propagation through formulas.
//!
//! A [`MeasuredValue`] carries a value, an absolute error and a unit. The
//! [`Evaluation`] builder derives new measurements from an expression over
//! named inputs: the value by substitution, the error from the worst-case
//! first-order formula of [`derive_error_formula`], and the unit by
//! evaluating the same expression over unit quantities. Inputs of mixed
//! scales are brought to SI before substituting.

mod error;
mod evaluator;
mod formula;
mod inference;
mod types;

#[cfg(test)]
mod tests;

pub use error::{MeasureError, MeasureResult};
pub use evaluator::{evaluate, Evaluation};
pub use formula::{derive_error_formula, error_formula_for, render_error_formula};
pub use inference::{infer, infer_unit, Inferred, UnitBindings};
pub use types::{CombineOp, Input, MeasuredValue, PLUS_MINUS};
