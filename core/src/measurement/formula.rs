//! Derivation of first-order uncertainty formulas.

use crate::algebra::{parse_expression, Expr, Function, ParseError, Var};

/// Parse `expression` and build its worst-case uncertainty formula.
pub fn derive_error_formula(expression: &str) -> Result<Expr, ParseError> {
    let expr = parse_expression(expression)?;
    Ok(error_formula_for(&expr))
}

/// `Σ |∂f/∂x · σx|` over the free value variables of `expr`.
///
/// Terms are summed linearly, not in quadrature. An expression without
/// variables has zero uncertainty.
pub fn error_formula_for(expr: &Expr) -> Expr {
    expr.free_symbols()
        .into_iter()
        .filter(|var| matches!(var, Var::Value(_)))
        .map(|var| {
            let partial = expr.diff(&var);
            Expr::call(
                Function::Abs,
                Expr::mul(partial, Expr::var(var.error_companion())),
            )
        })
        .reduce(Expr::add)
        .unwrap_or_else(|| Expr::number(0.0))
}

/// LaTeX for a formula from [`error_formula_for`], with the absolute-value
/// bars removed.
pub fn render_error_formula(formula: &Expr) -> String {
    formula
        .to_latex()
        .replace("\\left|", "")
        .replace("\\right|", "")
}
