//! Symbolic algebra over measurement expressions.
//!
//! Provides:
//! - Parsing of expression strings into an [`Expr`] tree
//! - Free-variable enumeration and symbolic differentiation
//! - Simplification through folding constructors
//! - Numeric evaluation by substitution
//! - Plain-text and LaTeX rendering

pub mod expr;
pub mod parser;
pub mod diff;
pub mod eval;
pub mod latex;

#[cfg(test)]
mod tests;

pub use diff::differentiate;
pub use eval::{EvalError, Substitution};
pub use expr::{BinaryOperator, Constant, Expr, Function, Symbol, UnaryOperator, Var, ERROR_PREFIX};
pub use parser::{parse_expression, ParseError};
