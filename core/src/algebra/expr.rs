//! Expression tree, symbols and the simplifying constructors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Prefix of the companion error variable of a measured symbol.
pub const ERROR_PREFIX: &str = "sigma_";

/// Name of a variable as it appears in an expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The symbol of a value that was never given one.
    pub fn placeholder() -> Self {
        Self("?".to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A variable: either a measured value or the uncertainty of one.
///
/// Keeping the two apart in the type means a user variable literally named
/// `sigma_x` never collides with the error of `x`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Var {
    Value(Symbol),
    Error(Symbol),
}

impl Var {
    pub fn value(name: impl Into<String>) -> Self {
        Self::Value(Symbol::new(name))
    }

    pub fn error(name: impl Into<String>) -> Self {
        Self::Error(Symbol::new(name))
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Value(s) | Self::Error(s) => s,
        }
    }

    /// The error variable paired with this one.
    pub fn error_companion(&self) -> Var {
        Var::Error(self.symbol().clone())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(s) => write!(f, "{}", s),
            Self::Error(s) => write!(f, "{}{}", ERROR_PREFIX, s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(&self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pi => write!(f, "pi"),
            Self::E => write!(f, "E"),
        }
    }
}

/// Built-in single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Abs,
    Sign,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            // natural log, as in most CAS front ends
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "abs" | "Abs" => Self::Abs,
            "sign" => Self::Sign,
            _ => return None,
        };
        Some(func)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Abs => "abs",
            Self::Sign => "sign",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Neg,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Built-in constant (pi, E)
    Constant(Constant),
    /// Variable reference
    Var(Var),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (negation)
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Function call
    FnCall { func: Function, arg: Box<Expr> },
}

impl Expr {
    pub fn number(n: f64) -> Expr {
        Expr::Number(n)
    }

    pub fn var(var: Var) -> Expr {
        Expr::Var(var)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_number() == Some(1.0)
    }

    fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    // The constructors below fold the trivial cases so derivatives stay readable.

    pub fn add(left: Expr, right: Expr) -> Expr {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Expr::Number(a + b),
            (Some(a), _) if a == 0.0 => right,
            (_, Some(b)) if b == 0.0 => left,
            _ => Self::binary(BinaryOperator::Add, left, right),
        }
    }

    pub fn sub(left: Expr, right: Expr) -> Expr {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Expr::Number(a - b),
            (_, Some(b)) if b == 0.0 => left,
            (Some(a), _) if a == 0.0 => Self::neg(right),
            _ if left == right => Expr::Number(0.0),
            _ => Self::binary(BinaryOperator::Sub, left, right),
        }
    }

    pub fn mul(left: Expr, right: Expr) -> Expr {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Expr::Number(a * b),
            _ if left.is_zero() || right.is_zero() => Expr::Number(0.0),
            (Some(a), _) if a == 1.0 => right,
            (_, Some(b)) if b == 1.0 => left,
            (Some(a), _) if a == -1.0 => Self::neg(right),
            (_, Some(b)) if b == -1.0 => Self::neg(left),
            _ => Self::binary(BinaryOperator::Mul, left, right),
        }
    }

    pub fn div(left: Expr, right: Expr) -> Expr {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) if b != 0.0 => Expr::Number(a / b),
            (Some(a), _) if a == 0.0 && !right.is_zero() => Expr::Number(0.0),
            (_, Some(b)) if b == 1.0 => left,
            _ if left == right && !right.is_zero() => Expr::Number(1.0),
            _ => Self::binary(BinaryOperator::Div, left, right),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        match (base.as_number(), exponent.as_number()) {
            (_, Some(e)) if e == 0.0 => Expr::Number(1.0),
            (_, Some(e)) if e == 1.0 => base,
            (Some(b), _) if b == 1.0 => Expr::Number(1.0),
            (Some(b), Some(e)) if b.powf(e).is_finite() => Expr::Number(b.powf(e)),
            _ => Self::binary(BinaryOperator::Pow, base, exponent),
        }
    }

    pub fn neg(operand: Expr) -> Expr {
        match operand {
            Expr::Number(n) => Expr::Number(-n),
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => *operand,
            other => Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand: Box::new(other),
            },
        }
    }

    pub fn call(func: Function, arg: Expr) -> Expr {
        match (func, arg) {
            (Function::Abs, Expr::Number(n)) => Expr::Number(n.abs()),
            (
                Function::Abs,
                Expr::UnaryOp {
                    op: UnaryOperator::Neg,
                    operand,
                },
            ) => Self::call(Function::Abs, *operand),
            (func, arg) => Expr::FnCall {
                func,
                arg: Box::new(arg),
            },
        }
    }

    /// Variables the expression depends on, in a stable order.
    pub fn free_symbols(&self) -> BTreeSet<Var> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Var>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Var(v) => {
                out.insert(v.clone());
            }
            Expr::BinaryOp { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
            Expr::UnaryOp { operand, .. } => operand.collect_symbols(out),
            Expr::FnCall { arg, .. } => arg.collect_symbols(out),
        }
    }

    pub fn contains(&self, var: &Var) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Var(v) => v == var,
            Expr::BinaryOp { left, right, .. } => left.contains(var) || right.contains(var),
            Expr::UnaryOp { operand, .. } => operand.contains(var),
            Expr::FnCall { arg, .. } => arg.contains(var),
        }
    }

    /// Rebuild the tree bottom-up through the folding constructors.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Var(_) => self.clone(),
            Expr::BinaryOp { op, left, right } => {
                let left = left.simplify();
                let right = right.simplify();
                match op {
                    BinaryOperator::Add => Self::add(left, right),
                    BinaryOperator::Sub => Self::sub(left, right),
                    BinaryOperator::Mul => Self::mul(left, right),
                    BinaryOperator::Div => Self::div(left, right),
                    BinaryOperator::Pow => Self::pow(left, right),
                }
            }
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => Self::neg(operand.simplify()),
            Expr::FnCall { func, arg } => Self::call(*func, arg.simplify()),
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expr::Number(n) if *n < 0.0 => 3,
            Expr::Number(_) | Expr::Constant(_) | Expr::Var(_) | Expr::FnCall { .. } => 5,
            Expr::BinaryOp { op, .. } => match op {
                BinaryOperator::Add | BinaryOperator::Sub => 1,
                BinaryOperator::Mul | BinaryOperator::Div => 2,
                BinaryOperator::Pow => 4,
            },
            Expr::UnaryOp { .. } => 3,
        }
    }
}

impl BinaryOperator {
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 4,
        }
    }

    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            Self::Add => " + ",
            Self::Sub => " - ",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

/// Plain-text rendering. Trees of value variables parse back to the same
/// shape; an error variable renders as `sigma_x` and parses back as the
/// value variable of that name.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::BinaryOp { op, left, right } => {
                let p = op.precedence();
                let (lp, rp) = (left.precedence(), right.precedence());
                let (left_parens, right_parens) = match op {
                    BinaryOperator::Pow => (lp <= p, rp < p),
                    BinaryOperator::Sub | BinaryOperator::Div => (lp < p, rp <= p),
                    BinaryOperator::Add | BinaryOperator::Mul => (lp < p, rp < p),
                };
                write_operand(f, left, left_parens)?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, right, right_parens)
            }
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => {
                write!(f, "-")?;
                write_operand(f, operand, operand.precedence() < 3)
            }
            Expr::FnCall { func, arg } => write!(f, "{}({})", func.name(), arg),
        }
    }
}
