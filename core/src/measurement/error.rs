use crate::algebra::{EvalError, ParseError};
use crate::units::UnitError;
use thiserror::Error;

/// Errors raised while building, converting or deriving measurements.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A free variable of the expression has no matching input
    #[error("Undefined variable: no input named '{0}'")]
    UndefinedVariable(String),

    /// Value, error and stored unit disagree
    #[error("Unit mismatch: value in '{value}', error in '{error}', declared unit '{unit}'")]
    UnitMismatch {
        value: String,
        error: String,
        unit: String,
    },

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
