//! Reduce a small telescope measurement chain and print the results.
//!
//! Run with `cargo run -p measure-core --example telescope`.

use measure_core::measurement::{render_error_formula, Evaluation, MeasureResult, MeasuredValue};
use measure_core::report::Report;
use measure_core::units::{NamedUnit, Unit};

fn main() -> MeasureResult<()> {
    let cm: Unit = NamedUnit::Centimeter.into();
    let mm: Unit = NamedUnit::Millimeter.into();

    let mut report = Report::new("Telescope")
        .with("D", MeasuredValue::new(8.5, 0.2, cm.clone()))
        .with("d", MeasuredValue::new(1.4, 0.1, cm))
        .with("F", MeasuredValue::new(350.0, 1.0, mm.clone()))
        .with("f", MeasuredValue::new(20.0, 1.0, mm));

    let m = Evaluation::new("F/f").inputs(report.inputs()).evaluate()?;
    if let Some(formula) = m.error_formula() {
        println!("sigma_m = {}", render_error_formula(formula));
    }
    report.insert("m", m);

    let mut g = Evaluation::new("(1/m)*(d/D)")
        .inputs(report.inputs())
        .dimensionless_fallback(Unit::radian())
        .evaluate()?;
    if let Some(formula) = g.error_formula() {
        println!("sigma_g = {}", render_error_formula(formula));
    }
    report.insert("g", g.clone());

    g.convert(&NamedUnit::Arcminute.into())?;
    report.insert("g_arcmin", g);

    println!("{}", report);
    Ok(())
}
