//! Two-stage telescope reduction: magnification from focal lengths, then the
//! angular size of an object from the eyepiece image.

use measure_core::measurement::{derive_error_formula, evaluate, Evaluation, MeasuredValue};
use measure_core::report::Report;
use measure_core::units::{NamedUnit, Unit};

fn unit(s: &str) -> Unit {
    s.parse().unwrap()
}

fn lens_report() -> Report {
    Report::new("Telescope")
        .with("D", MeasuredValue::new(8.5, 0.2, unit("cm")))
        .with("d", MeasuredValue::new(1.4, 0.1, unit("cm")))
        .with("F", MeasuredValue::new(350.0, 1.0, unit("mm")))
        .with("f", MeasuredValue::new(20.0, 1.0, unit("mm")))
}

fn magnification(report: &Report) -> MeasuredValue {
    Evaluation::new("F/f")
        .inputs(report.inputs())
        .name("m")
        .evaluate()
        .unwrap()
}

#[test]
fn test_magnification_stage() {
    let m = magnification(&lens_report());

    assert!((m.as_number() - 17.5).abs() < 1e-12);
    // 1/20 + 350/20^2
    assert!((m.error_as_number() - 0.925).abs() < 1e-12);
    assert!(m.unit().unwrap().is_dimensionless());
    assert_eq!(m.render(), "m = (17.5 ± 0.925)");
}

#[test]
fn test_angular_size_stage() {
    let mut report = lens_report();
    let m = magnification(&report);
    report.insert("m", m);

    let g = Evaluation::new("(1/m)*(d/D)")
        .inputs(report.inputs())
        .name("g")
        .symbol("theta")
        .dimensionless_fallback(Unit::radian())
        .evaluate()
        .unwrap();

    assert!((g.as_number() - 0.009411764705882352).abs() < 1e-12);
    assert!((g.error_as_number() - 0.0013912011863568957).abs() < 1e-12);
    assert_eq!(g.unit().unwrap(), &Unit::radian());
    assert_eq!(g.symbol().name(), "theta");

    report.insert("g", g);
    let rendered = report.render();
    assert!(rendered.starts_with("-----------Telescope---------------\n"));
    assert!(rendered.contains(" g = (0.00941176470588"));
    assert!(rendered.ends_with(" rad \n-----------------------------"));
}

#[test]
fn test_angular_size_in_arcminutes() {
    let mut report = lens_report();
    report.insert("m", magnification(&report));

    let mut g = Evaluation::new("(1/m)*(d/D)")
        .inputs(report.inputs())
        .dimensionless_fallback(Unit::radian())
        .evaluate()
        .unwrap();
    g.convert(&NamedUnit::Arcminute.into()).unwrap();

    let per_rad = 180.0 * 60.0 / std::f64::consts::PI;
    assert!((g.as_number() - 0.009411764705882352 * per_rad).abs() < 1e-9);
    assert!((g.error_as_number() - 0.0013912011863568957 * per_rad).abs() < 1e-9);
}

#[test]
fn test_stage_formulas() {
    let formula = derive_error_formula("(1/m)*(d/D)").unwrap();
    let errors: Vec<String> = formula
        .free_symbols()
        .iter()
        .map(|v| v.to_string())
        .filter(|s| s.starts_with("sigma_"))
        .collect();
    assert_eq!(errors, ["sigma_D", "sigma_d", "sigma_m"]);
}

/// An angle that only became `rad` through the fallback does not cancel
/// against a length: the product keeps both units.
#[test]
fn test_fallback_angle_times_length_keeps_radian() {
    let theta = evaluate(
        "d/D",
        [
            ("d", MeasuredValue::new(1.4, 0.1, unit("cm"))),
            ("D", MeasuredValue::new(8.5, 0.2, unit("cm"))),
        ],
    )
    .unwrap();
    let theta = MeasuredValue::new(theta.as_number(), theta.error_as_number(), Unit::radian());

    let size = evaluate(
        "theta*L",
        [
            ("theta", theta),
            ("L", MeasuredValue::new(2.0, 0.1, unit("m"))),
        ],
    )
    .unwrap();

    let expected: Unit = Unit::radian().checked_mul(&unit("m")).unwrap();
    assert_eq!(size.unit().unwrap(), &expected);
    assert_eq!(size.unit().unwrap().to_string(), "m rad");
}
