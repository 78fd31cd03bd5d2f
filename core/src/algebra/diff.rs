//! Symbolic differentiation.

use super::expr::{BinaryOperator, Expr, Function, UnaryOperator, Var};

impl Expr {
    /// Partial derivative with respect to `var`.
    pub fn diff(&self, var: &Var) -> Expr {
        if !self.contains(var) {
            return Expr::number(0.0);
        }

        match self {
            Expr::Number(_) | Expr::Constant(_) => Expr::number(0.0),

            Expr::Var(v) => Expr::number(if v == var { 1.0 } else { 0.0 }),

            Expr::BinaryOp { op, left, right } => {
                let (l, r) = (left.as_ref(), right.as_ref());
                match op {
                    BinaryOperator::Add => Expr::add(l.diff(var), r.diff(var)),
                    BinaryOperator::Sub => Expr::sub(l.diff(var), r.diff(var)),
                    // (lr)' = l'r + lr'
                    BinaryOperator::Mul => Expr::add(
                        Expr::mul(l.diff(var), r.clone()),
                        Expr::mul(l.clone(), r.diff(var)),
                    ),
                    // (l/r)' = (l'r - lr') / r^2
                    BinaryOperator::Div => Expr::div(
                        Expr::sub(
                            Expr::mul(l.diff(var), r.clone()),
                            Expr::mul(l.clone(), r.diff(var)),
                        ),
                        Expr::pow(r.clone(), Expr::number(2.0)),
                    ),
                    BinaryOperator::Pow => diff_pow(l, r, var),
                }
            }

            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand,
            } => Expr::neg(operand.diff(var)),

            Expr::FnCall { func, arg } => {
                Expr::mul(outer_derivative(*func, arg), arg.diff(var))
            }
        }
    }
}

fn diff_pow(base: &Expr, exponent: &Expr, var: &Var) -> Expr {
    let base_varies = base.contains(var);
    let exponent_varies = exponent.contains(var);

    if !exponent_varies {
        // n * b^(n-1) * b'
        let reduced = Expr::sub(exponent.clone(), Expr::number(1.0));
        return Expr::mul(
            Expr::mul(exponent.clone(), Expr::pow(base.clone(), reduced)),
            base.diff(var),
        );
    }

    let ln_base = Expr::call(Function::Ln, base.clone());
    let power = Expr::pow(base.clone(), exponent.clone());
    if !base_varies {
        // b^e * ln(b) * e'
        return Expr::mul(Expr::mul(power, ln_base), exponent.diff(var));
    }

    // b^e * (e' ln(b) + e b' / b)
    Expr::mul(
        power,
        Expr::add(
            Expr::mul(exponent.diff(var), ln_base),
            Expr::div(Expr::mul(exponent.clone(), base.diff(var)), base.clone()),
        ),
    )
}

/// f'(arg) for the built-in functions.
fn outer_derivative(func: Function, arg: &Expr) -> Expr {
    let a = arg.clone();
    let one = || Expr::number(1.0);
    let square = |e: Expr| Expr::pow(e, Expr::number(2.0));

    match func {
        Function::Sin => Expr::call(Function::Cos, a),
        Function::Cos => Expr::neg(Expr::call(Function::Sin, a)),
        Function::Tan => Expr::div(one(), square(Expr::call(Function::Cos, a))),
        Function::Asin => Expr::div(
            one(),
            Expr::call(Function::Sqrt, Expr::sub(one(), square(a))),
        ),
        Function::Acos => Expr::neg(Expr::div(
            one(),
            Expr::call(Function::Sqrt, Expr::sub(one(), square(a))),
        )),
        Function::Atan => Expr::div(one(), Expr::add(one(), square(a))),
        Function::Sinh => Expr::call(Function::Cosh, a),
        Function::Cosh => Expr::call(Function::Sinh, a),
        Function::Tanh => Expr::div(one(), square(Expr::call(Function::Cosh, a))),
        Function::Sqrt => Expr::div(
            one(),
            Expr::mul(Expr::number(2.0), Expr::call(Function::Sqrt, a)),
        ),
        Function::Exp => Expr::call(Function::Exp, a),
        Function::Ln => Expr::div(one(), a),
        Function::Log10 => Expr::div(
            one(),
            Expr::mul(a, Expr::call(Function::Ln, Expr::number(10.0))),
        ),
        Function::Abs => Expr::call(Function::Sign, a),
        Function::Sign => Expr::number(0.0),
    }
}

/// Partial derivative of `expr` with respect to `var`.
pub fn differentiate(expr: &Expr, var: &Var) -> Expr {
    expr.diff(var)
}
