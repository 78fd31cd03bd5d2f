//! Numeric evaluation of an expression by substitution.

use super::expr::{BinaryOperator, Expr, Function, UnaryOperator, Var};
use std::collections::HashMap;
use thiserror::Error;

/// Numeric values for the variables of an expression.
pub type Substitution = HashMap<Var, f64>;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Variable without a substituted value
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Division by zero")]
    DivisionByZero,

    /// Argument outside a function's domain (e.g., sqrt of negative)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Expr {
    /// Substitute numbers for every variable and evaluate.
    pub fn eval(&self, subs: &Substitution) -> Result<f64, EvalError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Constant(c) => Ok(c.value()),
            Expr::Var(var) => subs
                .get(var)
                .copied()
                .ok_or_else(|| EvalError::UndefinedVariable(var.to_string())),
            Expr::BinaryOp { op, left, right } => {
                apply_binary(*op, left.eval(subs)?, right.eval(subs)?)
            }
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => operand.eval(subs).map(|v| -v),
            Expr::FnCall { func, arg } => apply_function(*func, arg.eval(subs)?),
        }
    }
}

fn apply_binary(op: BinaryOperator, l: f64, r: f64) -> Result<f64, EvalError> {
    let value = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        BinaryOperator::Div if r == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOperator::Div => l / r,
        BinaryOperator::Pow if l == 0.0 && r < 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOperator::Pow => l.powf(r),
    };
    if value.is_nan() && !(l.is_nan() || r.is_nan()) {
        return Err(EvalError::InvalidArgument(format!("{} {} {} is undefined", l, op.symbol().trim(), r)));
    }
    Ok(value)
}

/// The argument requirement `val` violates, if any.
fn domain_violation(func: Function, val: f64) -> Option<&'static str> {
    match func {
        Function::Asin | Function::Acos if !(-1.0..=1.0).contains(&val) => Some("within [-1, 1]"),
        Function::Sqrt if val < 0.0 => Some("non-negative"),
        Function::Ln | Function::Log10 if val <= 0.0 => Some("positive"),
        _ => None,
    }
}

fn apply_function(func: Function, val: f64) -> Result<f64, EvalError> {
    if let Some(requirement) = domain_violation(func, val) {
        return Err(EvalError::InvalidArgument(format!(
            "{}({}): argument must be {}",
            func.name(),
            val,
            requirement
        )));
    }
    Ok(match func {
        Function::Sin => val.sin(),
        Function::Cos => val.cos(),
        Function::Tan => val.tan(),
        Function::Asin => val.asin(),
        Function::Acos => val.acos(),
        Function::Atan => val.atan(),
        Function::Sinh => val.sinh(),
        Function::Cosh => val.cosh(),
        Function::Tanh => val.tanh(),
        Function::Sqrt => val.sqrt(),
        Function::Exp => val.exp(),
        Function::Ln => val.ln(),
        Function::Log10 => val.log10(),
        Function::Abs => val.abs(),
        // f64::signum maps 0.0 to 1.0
        Function::Sign if val == 0.0 => 0.0,
        Function::Sign => val.signum(),
    })
}
