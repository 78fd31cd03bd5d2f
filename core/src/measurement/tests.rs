use super::*;
use crate::algebra::{parse_expression, Substitution, Var};
use crate::units::{NamedUnit, Quantity, Unit, UnitError};

fn unit(s: &str) -> Unit {
    s.parse().unwrap()
}

fn mv(value: f64, error: f64, u: &str) -> MeasuredValue {
    MeasuredValue::new(value, error, unit(u))
}

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

// --- MeasuredValue ---

#[test]
fn test_new_measurement_is_consistent() {
    let d = mv(8.5, 0.2, "cm");
    assert_eq!(d.as_number(), 8.5);
    assert_eq!(d.error_as_number(), 0.2);
    assert_eq!(d.unit().unwrap(), &unit("cm"));
    assert_eq!(d.as_quantity(), Quantity::new(8.5, unit("cm")));
    assert_eq!(d.error_as_quantity(), Quantity::new(0.2, unit("cm")));
    assert_eq!(d.symbol().name(), "?");
    assert!(d.name().is_none());
    assert!(d.error_formula().is_none());
}

#[test]
fn test_mismatched_parts_fail_unit_check() {
    let bad = MeasuredValue::from_quantities(
        Quantity::new(1.0, unit("m")),
        Quantity::new(1.0, unit("cm")),
        unit("m"),
    );
    assert!(matches!(bad.check_units(), Err(MeasureError::UnitMismatch { .. })));
    assert!(bad.unit().is_err());
}

#[test]
fn test_convert_scales_value_and_error() {
    let mut d = mv(8.5, 0.2, "cm");
    d.convert(&unit("mm")).unwrap();
    assert!(approx(d.as_number(), 85.0, 1e-9));
    assert!(approx(d.error_as_number(), 2.0, 1e-9));
    assert_eq!(d.unit().unwrap(), &unit("mm"));
}

#[test]
fn test_conversion_round_trip() {
    let original = mv(8.5, 0.2, "cm");

    let mut chained = original.clone();
    chained.convert(&unit("mm")).unwrap().convert(&unit("km")).unwrap();

    let mut direct = original.clone();
    direct.convert(&unit("km")).unwrap();

    assert!(approx(chained.as_number(), direct.as_number(), 1e-15));
    assert!(approx(chained.error_as_number(), direct.error_as_number(), 1e-15));
    // value and error scale by the same factor
    let ratio = direct.as_number() / original.as_number();
    assert!(approx(direct.error_as_number() / original.error_as_number(), ratio, 1e-12));
}

#[test]
fn test_failed_conversion_leaves_value_untouched() {
    let mut d = mv(8.5, 0.2, "cm");
    let err = d.convert(&unit("s")).unwrap_err();
    assert!(matches!(err, MeasureError::Unit(UnitError::Incompatible { .. })));
    assert_eq!(d, mv(8.5, 0.2, "cm"));
}

#[test]
fn test_to_si() {
    let f = mv(350.0, 1.0, "mm").to_si().unwrap();
    assert!(approx(f.as_number(), 0.35, 1e-12));
    assert!(approx(f.error_as_number(), 0.001, 1e-12));
    assert_eq!(f.unit().unwrap(), &unit("m"));

    let speed = mv(36.0, 3.6, "km / h").to_si().unwrap();
    assert!(approx(speed.as_number(), 10.0, 1e-9));
    assert_eq!(speed.unit().unwrap(), &unit("m / s"));
}

#[test]
fn test_render() {
    let d = mv(8.5, 0.2, "cm").with_name("D");
    assert_eq!(d.render(), "D = (8.5 ± 0.2) cm");
    assert_eq!(d.to_string(), d.render());

    let plain = MeasuredValue::new(17.5, 0.925, Unit::dimensionless()).with_symbol("m");
    assert_eq!(plain.render(), "m = (17.5 ± 0.925)");
    assert!(plain.render().contains(PLUS_MINUS));
}

// --- combine ---

#[test]
fn test_combine_multiply_uses_relative_error_sum() {
    let a = mv(4.0, 0.2, "m");
    let b = mv(200.0, 20.0, "cm");
    let product = a
        .combine(&Input::from(&b), CombineOp::Multiply)
        .unwrap()
        .unwrap();
    // b becomes 2 m before multiplying
    assert!(approx(product.as_number(), 8.0, 1e-12));
    assert!(approx(product.error_as_number(), 8.0 * (0.05 + 0.1), 1e-12));
    assert_eq!(product.unit().unwrap(), &unit("m^2"));

    let sugar = (&a * &b).unwrap().unwrap();
    assert_eq!(sugar, product);
}

#[test]
fn test_combine_divide() {
    let a = mv(6.0, 0.3, "s");
    let b = mv(2.0, 0.2, "s");
    let ratio = a.combine(&b.into(), CombineOp::Divide).unwrap().unwrap();
    assert!(approx(ratio.as_number(), 3.0, 1e-12));
    assert!(approx(ratio.error_as_number(), 3.0 * (0.05 + 0.1), 1e-12));
    assert!(ratio.unit().unwrap().is_dimensionless());
}

#[test]
fn test_combine_with_constant_is_not_applicable() {
    let a = mv(4.0, 0.2, "m");
    let constant = Input::from(Quantity::new(2.0, unit("m")));
    assert_eq!(a.combine(&constant, CombineOp::Multiply).unwrap(), None);
}

#[test]
fn test_combine_meter_with_watt_fails() {
    let length = mv(100.0, 50.0, "m");
    let power = mv(5.0, 2.0, "W");
    let result = length.combine(&power.into(), CombineOp::Multiply);
    assert!(matches!(
        result,
        Err(MeasureError::Unit(UnitError::Incompatible { .. }))
    ));
}

// --- error formula ---

#[test]
fn test_error_formula_is_deterministic() {
    let first = derive_error_formula("(1/m)*(d/D)").unwrap();
    let second = derive_error_formula("(1/m)*(d/D)").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_error_formula_linear_sum() {
    let formula = derive_error_formula("a + b").unwrap();
    assert_eq!(formula.to_string(), "abs(sigma_a) + abs(sigma_b)");

    let subs = Substitution::from([
        (Var::value("a"), 1.0),
        (Var::value("b"), 2.0),
        (Var::error("a"), 0.3),
        (Var::error("b"), 0.4),
    ]);
    // worst case, not sqrt(0.3^2 + 0.4^2)
    assert!(approx(formula.eval(&subs).unwrap(), 0.7, 1e-12));
}

#[test]
fn test_error_formula_single_variable() {
    assert_eq!(derive_error_formula("x").unwrap().to_string(), "abs(sigma_x)");
    assert_eq!(derive_error_formula("2*x").unwrap().to_string(), "abs(2*sigma_x)");
}

#[test]
fn test_error_formula_of_constant_is_zero() {
    assert!(derive_error_formula("2*pi + 3").unwrap().is_zero());
    assert!(derive_error_formula("x - x").unwrap().is_zero());
}

#[test]
fn test_error_formula_only_references_present_variables() {
    let formula = derive_error_formula("F/f").unwrap();
    let symbols: Vec<String> = formula.free_symbols().iter().map(|v| v.to_string()).collect();
    assert_eq!(symbols, ["F", "f", "sigma_F", "sigma_f"]);
}

#[test]
fn test_error_formula_parse_failure() {
    assert!(derive_error_formula("a + * b").is_err());
    assert!(derive_error_formula("foo(x)").is_err());
}

#[test]
fn test_render_error_formula_strips_bars() {
    let formula = derive_error_formula("a + b").unwrap();
    assert!(formula.to_latex().contains("\\left|"));
    assert_eq!(render_error_formula(&formula), "\\sigma_{a} + \\sigma_{b}");
}

#[test]
fn test_error_formula_for_parsed_tree() {
    let expr = parse_expression("x*y").unwrap();
    assert_eq!(error_formula_for(&expr), derive_error_formula("x*y").unwrap());
}

// --- evaluation ---

#[test]
fn test_zero_error_inputs_give_zero_error() {
    let result = evaluate(
        "a*b*sin(c)",
        [
            ("a", Input::from(mv(2.0, 0.0, "m"))),
            ("b", Input::from(Quantity::new(3.0, unit("m")))),
            ("c", Input::from(0.5)),
        ],
    )
    .unwrap();
    assert_eq!(result.error_as_number(), 0.0);
    assert!(approx(result.as_number(), 6.0 * 0.5f64.sin(), 1e-12));
    assert_eq!(result.unit().unwrap(), &unit("m^2"));
}

#[test]
fn test_identity_expression_returns_input() {
    let x = mv(3.2, 0.4, "s");
    let result = evaluate("x", [("x", &x)]).unwrap();
    assert_eq!(result.as_number(), 3.2);
    assert_eq!(result.error_as_number(), 0.4);
    assert_eq!(result.unit().unwrap(), &unit("s"));
}

#[test]
fn test_sum_error_is_sum_of_errors() {
    let result = evaluate("a + b", [("a", mv(1.0, 0.1, "m")), ("b", mv(2.0, 0.25, "m"))]).unwrap();
    assert!(approx(result.as_number(), 3.0, 1e-12));
    assert!(approx(result.error_as_number(), 0.35, 1e-12));
}

#[test]
fn test_unit_inference_for_quotient() {
    let speed = evaluate("d/t", [("d", mv(10.0, 0.1, "m")), ("t", mv(2.0, 0.1, "s"))]).unwrap();
    assert_eq!(speed.unit().unwrap(), &unit("m / s"));
    assert!(approx(speed.as_number(), 5.0, 1e-12));
}

#[test]
fn test_dimensionless_fallback() {
    let inputs = [("F", mv(350.0, 1.0, "mm")), ("f", mv(20.0, 1.0, "mm"))];

    let plain = evaluate("F/f", inputs.clone()).unwrap();
    assert!(plain.unit().unwrap().is_dimensionless());

    let angle = Evaluation::new("F/f")
        .inputs(inputs)
        .dimensionless_fallback(Unit::radian())
        .evaluate()
        .unwrap();
    assert_eq!(angle.unit().unwrap(), &Unit::radian());
}

#[test]
fn test_fallback_ignores_scaled_ratios() {
    // mm / cm is dimensionless but not the canonical unitless unit
    let ratio = Evaluation::new("a/b")
        .input("a", mv(5.0, 0.1, "mm"))
        .input("b", mv(1.0, 0.1, "cm"))
        .dimensionless_fallback(Unit::radian())
        .evaluate()
        .unwrap();
    assert_eq!(ratio.unit().unwrap(), &unit("mm / cm"));
}

#[test]
fn test_name_symbol_and_formula_are_attached() {
    let result = Evaluation::new("2*x")
        .input("x", mv(1.0, 0.1, "m"))
        .name("doubled")
        .symbol("y")
        .evaluate()
        .unwrap();
    assert_eq!(result.name(), Some("doubled"));
    assert_eq!(result.symbol().name(), "y");
    assert_eq!(result.error_formula().unwrap().to_string(), "abs(2*sigma_x)");
}

#[test]
fn test_extra_inputs_are_ignored() {
    let broken = MeasuredValue::from_quantities(
        Quantity::new(1.0, unit("m")),
        Quantity::new(1.0, unit("s")),
        unit("m"),
    );
    let result = Evaluation::new("x")
        .input("x", mv(1.0, 0.1, "m"))
        .input("unused", broken)
        .evaluate();
    assert!(result.is_ok());
}

#[test]
fn test_missing_input_is_undefined_variable() {
    let result = evaluate("x*y", [("x", mv(1.0, 0.1, "m"))]);
    assert_eq!(result, Err(MeasureError::UndefinedVariable("y".to_string())));
}

#[test]
fn test_inconsistent_input_reports_mismatch() {
    let bad = MeasuredValue::from_quantities(
        Quantity::new(1.0, unit("m")),
        Quantity::new(1.0, unit("s")),
        unit("m"),
    );
    let result = evaluate("2*x", [("x", bad)]);
    assert!(matches!(result, Err(MeasureError::UnitMismatch { .. })));
}

#[test]
fn test_evaluation_error_kinds() {
    assert!(matches!(Evaluation::new("1 +").evaluate(), Err(MeasureError::Parse(_))));

    let result = evaluate("a + b", [("a", mv(1.0, 0.1, "m")), ("b", mv(1.0, 0.1, "s"))]);
    assert!(matches!(result, Err(MeasureError::Unit(UnitError::Incompatible { .. }))));

    let result = evaluate("sqrt(x)", [("x", Input::from(-4.0))]);
    assert!(matches!(result, Err(MeasureError::Eval(_))));

    let result = evaluate("1/x", [("x", Input::from(0.0))]);
    assert!(matches!(result, Err(MeasureError::Eval(_))));
}

#[test]
fn test_angle_inputs_in_trig() {
    let theta = MeasuredValue::new(30.0, 1.0, NamedUnit::Degree.into());
    let result = evaluate("sin(theta)", [("theta", &theta)]).unwrap();
    assert!(approx(result.as_number(), 0.5, 1e-12));
    // d/dθ sin θ = cos θ, with σ = 1° in radians
    let sigma = 30f64.to_radians().cos() * 1f64.to_radians();
    assert!(approx(result.error_as_number(), sigma, 1e-12));
    assert!(result.unit().unwrap().is_dimensionless());

    let mut theta_rad = theta.clone();
    theta_rad.convert(&Unit::radian()).unwrap();
    let same = evaluate("sin(theta)", [("theta", &theta_rad)]).unwrap();
    assert!(approx(same.as_number(), result.as_number(), 1e-12));
    assert!(approx(same.error_as_number(), result.error_as_number(), 1e-12));
}

#[test]
fn test_sum_of_mixed_scales_is_converted() {
    let result = evaluate("a + b", [("a", mv(1.0, 0.1, "cm")), ("b", mv(5.0, 0.1, "mm"))]).unwrap();
    assert_eq!(result.unit().unwrap(), &unit("cm"));
    assert!(approx(result.as_number(), 1.5, 1e-12));
    assert!(approx(result.error_as_number(), 0.11, 1e-12));

    let result = evaluate("b - a", [("a", mv(1.0, 0.1, "cm")), ("b", mv(5.0, 0.1, "mm"))]).unwrap();
    assert_eq!(result.unit().unwrap(), &unit("mm"));
    assert!(approx(result.as_number(), -5.0, 1e-12));
    assert!(approx(result.error_as_number(), 1.1, 1e-12));
}

#[test]
fn test_mixed_scales_inside_products_and_functions() {
    let inputs = [("a", mv(5.0, 0.0, "mm")), ("b", mv(1.0, 0.0, "cm"))];

    // a scaled ratio added to a plain number
    let result = evaluate("a/b + 1", inputs.clone()).unwrap();
    assert_eq!(result.unit().unwrap(), &unit("mm / cm"));
    assert!(approx(result.as_number(), 15.0, 1e-9));

    let result = evaluate("exp(a/b)", inputs.clone()).unwrap();
    assert!(result.unit().unwrap().is_dimensionless());
    assert!(approx(result.as_number(), 0.5f64.exp(), 1e-12));

    let result = evaluate("b*(b + a)", inputs).unwrap();
    assert_eq!(result.unit().unwrap(), &unit("cm^2"));
    assert!(approx(result.as_number(), 1.5, 1e-12));
}

#[test]
fn test_exponent_overflow_is_a_unit_error() {
    let x = mv(1.0, 0.0, "m");
    for expression in ["x^2000000000 * x^2000000000", "x^3000000000", "x^40000 * x^40000"] {
        let result = evaluate(expression, [("x", &x)]);
        assert!(
            matches!(result, Err(MeasureError::Unit(UnitError::ExponentOutOfRange { .. }))),
            "{}: {:?}",
            expression,
            result
        );
    }
}
