//! LaTeX rendering of expressions.

use super::expr::{BinaryOperator, Constant, Expr, Function, Symbol, UnaryOperator, Var};

const GREEK: [&str; 24] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi",
    "psi", "omega",
];

fn greek_or_plain(part: &str) -> String {
    let lower = part.to_ascii_lowercase();
    if GREEK.contains(&lower.as_str()) && lower != "omicron" {
        // capitalised names map to the upper-case letter
        format!("\\{}", part)
    } else {
        part.to_string()
    }
}

/// `theta_obj` becomes `\theta_{obj}`.
fn symbol_latex(symbol: &Symbol) -> String {
    match symbol.name().split_once('_') {
        Some((head, tail)) if !head.is_empty() && !tail.is_empty() => {
            format!("{}_{{{}}}", greek_or_plain(head), greek_or_plain(tail))
        }
        _ => greek_or_plain(symbol.name()),
    }
}

fn var_latex(var: &Var) -> String {
    match var {
        Var::Value(s) => symbol_latex(s),
        Var::Error(s) => format!("\\sigma_{{{}}}", symbol_latex(s)),
    }
}

/// Fractions render as self-delimiting blocks and never need parentheses.
fn latex_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp {
            op: BinaryOperator::Div,
            ..
        } => 5,
        _ => expr.precedence(),
    }
}

fn paren(inner: String) -> String {
    format!("\\left({}\\right)", inner)
}

fn function_latex(func: Function, arg: &Expr) -> String {
    let inner = arg.to_latex();
    match func {
        Function::Sqrt => format!("\\sqrt{{{}}}", inner),
        Function::Abs => format!("\\left|{}\\right|", inner),
        Function::Exp => format!("e^{{{}}}", inner),
        Function::Log10 => format!("\\log_{{10}}{}", paren(inner)),
        Function::Asin => format!("\\arcsin{}", paren(inner)),
        Function::Acos => format!("\\arccos{}", paren(inner)),
        Function::Atan => format!("\\arctan{}", paren(inner)),
        Function::Sign => format!("\\operatorname{{sign}}{}", paren(inner)),
        Function::Sin
        | Function::Cos
        | Function::Tan
        | Function::Sinh
        | Function::Cosh
        | Function::Tanh
        | Function::Ln => format!("\\{}{}", func.name(), paren(inner)),
    }
}

impl Expr {
    /// Render as a LaTeX math fragment.
    pub fn to_latex(&self) -> String {
        match self {
            Expr::Number(n) => n.to_string(),
            Expr::Constant(Constant::Pi) => "\\pi".to_string(),
            Expr::Constant(Constant::E) => "e".to_string(),
            Expr::Var(v) => var_latex(v),
            Expr::BinaryOp { op, left, right } => {
                let wrap = |e: &Expr, needs: bool| {
                    if needs {
                        paren(e.to_latex())
                    } else {
                        e.to_latex()
                    }
                };
                let p = op.precedence();
                match op {
                    BinaryOperator::Add => format!("{} + {}", left.to_latex(), right.to_latex()),
                    BinaryOperator::Sub => format!(
                        "{} - {}",
                        left.to_latex(),
                        wrap(right, latex_precedence(right) <= p)
                    ),
                    BinaryOperator::Mul => format!(
                        "{} \\cdot {}",
                        wrap(left, latex_precedence(left) < p),
                        wrap(right, latex_precedence(right) <= p)
                    ),
                    BinaryOperator::Div => {
                        format!("\\frac{{{}}}{{{}}}", left.to_latex(), right.to_latex())
                    }
                    BinaryOperator::Pow => {
                        let atomic = match left.as_ref() {
                            Expr::Number(n) => *n >= 0.0,
                            Expr::Constant(_) | Expr::Var(_) => true,
                            Expr::FnCall { func, .. } => *func != Function::Exp,
                            _ => false,
                        };
                        format!("{}^{{{}}}", wrap(left, !atomic), right.to_latex())
                    }
                }
            }
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => {
                if latex_precedence(operand) < 3 {
                    format!("-{}", paren(operand.to_latex()))
                } else {
                    format!("-{}", operand.to_latex())
                }
            }
            Expr::FnCall { func, arg } => function_latex(*func, arg),
        }
    }
}
