//! Tests across parsing, rendering and simplification.

use super::*;

#[test]
fn test_display_round_trips_through_parser() {
    for input in [
        "a + b",
        "a - (b - c)",
        "a/(b*c)",
        "(a + b)^2",
        "a^b^c",
        "(a^b)^c",
        "-x^2",
        "(-x)^2",
        "x^(-2)",
        "-(a + b)",
        "sqrt(x^2 + y^2)/2",
        "2*pi*r",
        "abs(E*x)",
    ] {
        let expr = parse_expression(input).unwrap();
        let rendered = expr.to_string();
        assert_eq!(rendered, input);
        assert_eq!(parse_expression(&rendered).unwrap(), expr);
    }
}

#[test]
fn test_display_drops_redundant_parentheses() {
    let expr = parse_expression("((a) + (b*c))").unwrap();
    assert_eq!(expr.to_string(), "a + b*c");
}

#[test]
fn test_error_variables_render_with_prefix() {
    let expr = Expr::mul(Expr::var(Var::value("b")), Expr::var(Var::error("a")));
    assert_eq!(expr.to_string(), format!("b*{}a", ERROR_PREFIX));
}

#[test]
fn test_error_variables_reparse_as_values() {
    let expr = Expr::var(Var::error("a"));
    let reparsed = parse_expression(&expr.to_string()).unwrap();
    assert_eq!(reparsed, Expr::var(Var::value(format!("{}a", ERROR_PREFIX))));
    assert_ne!(reparsed, expr);
}

#[test]
fn test_free_symbols_are_sorted_and_unique() {
    let expr = parse_expression("z*y + x/z - sin(y)").unwrap();
    let names: Vec<String> = expr.free_symbols().iter().map(|v| v.to_string()).collect();
    assert_eq!(names, vec!["x", "y", "z"]);
}

#[test]
fn test_free_symbols_skip_constants() {
    let expr = parse_expression("2*pi*E").unwrap();
    assert!(expr.free_symbols().is_empty());
}

#[test]
fn test_simplify_folds_identities() {
    let cases = [
        ("x*1", "x"),
        ("1*x", "x"),
        ("x*0 + y", "y"),
        ("0 + x - 0", "x"),
        ("x^1", "x"),
        ("x^0", "1"),
        ("2*3 + x", "6 + x"),
        ("x/1", "x"),
        ("x/x", "1"),
        ("x - x", "0"),
        ("--x", "x"),
        ("abs(-x)", "abs(x)"),
        ("-1*x", "-x"),
    ];
    for (input, expected) in cases {
        let simplified = parse_expression(input).unwrap().simplify();
        assert_eq!(simplified.to_string(), expected, "simplifying {}", input);
    }
}

#[test]
fn test_simplify_preserves_value() {
    let expr = parse_expression("(x*1 + 0)*(y^1)/(2*1) - 0*z").unwrap();
    let subs = Substitution::from([
        (Var::value("x"), 3.0),
        (Var::value("y"), 4.0),
        (Var::value("z"), 5.0),
    ]);
    let simplified = expr.simplify();
    assert_eq!(simplified.to_string(), "x*y/2");
    assert_eq!(expr.eval(&subs).unwrap(), simplified.eval(&subs).unwrap());
}

#[test]
fn test_differentiate_free_function() {
    let expr = parse_expression("3*x").unwrap();
    let d = differentiate(&expr, &Var::value("x"));
    assert_eq!(d.as_number(), Some(3.0));
}

#[test]
fn test_expression_serialization_round_trip() {
    let expr = parse_expression("abs(F/f^2)").unwrap();
    let json = serde_json::to_string(&expr).unwrap();
    let restored: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, expr);
}
