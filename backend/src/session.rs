//! Text command protocol of a measurement session.
//!
//! Every incoming frame is one command; the replies are prefixed text
//! frames the frontend dispatches on.
//!
//! The JSON carried by `REPORT_UPDATE` and `MEASUREMENT_UPDATE` mirrors the
//! current serde form of the core types. It is internal to this server and
//! its frontend, not a stable interchange format.

use measure_core::algebra::ParseError;
use measure_core::measurement::{
    derive_error_formula, render_error_formula, Evaluation, MeasureError, MeasuredValue,
};
use measure_core::report::Report;
use measure_core::units::{Unit, UnitError};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

pub type SharedReport = Arc<RwLock<Report>>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed command payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error("No measurement named '{0}'")]
    NotFound(String),
}

impl From<UnitError> for CommandError {
    fn from(e: UnitError) -> Self {
        CommandError::Measure(e.into())
    }
}

impl From<ParseError> for CommandError {
    fn from(e: ParseError) -> Self {
        CommandError::Measure(e.into())
    }
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Payload(_) => "INVALID_COMMAND",
            CommandError::NotFound(_) => "NOT_FOUND",
            CommandError::Measure(e) => match e {
                MeasureError::Parse(_) => "PARSE_ERROR",
                MeasureError::UndefinedVariable(_) => "UNDEFINED_VARIABLE",
                MeasureError::UnitMismatch { .. } => "UNIT_MISMATCH",
                MeasureError::Unit(_) => "UNIT_ERROR",
                MeasureError::Eval(_) => "EVALUATION_FAILED",
            },
        }
    }

    pub fn severity(&self) -> &'static str {
        match self {
            CommandError::NotFound(_) => "warning",
            _ => "error",
        }
    }
}

/// Format an error as a JSON message for the frontend
pub fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": code,
            "message": message,
            "severity": severity
        })
    )
}

#[derive(Deserialize)]
struct MeasureCmd {
    name: String,
    value: f64,
    error: f64,
    #[serde(default)]
    unit: String,
    symbol: Option<String>,
}

#[derive(Deserialize)]
struct EvaluateCmd {
    name: String,
    expression: String,
    symbol: Option<String>,
    fallback_unit: Option<String>,
}

#[derive(Deserialize)]
struct ConvertCmd {
    name: String,
    unit: String,
}

/// Run one command against the session report and return the replies.
pub fn handle_command(report: &RwLock<Report>, text: &str) -> Vec<String> {
    match dispatch(report, text) {
        Ok(replies) => replies,
        Err(e) => {
            warn!("Command failed: {}", e);
            vec![format_error(e.code(), &e.to_string(), e.severity())]
        }
    }
}

fn dispatch(report: &RwLock<Report>, text: &str) -> Result<Vec<String>, CommandError> {
    // a poisoned lock still holds a usable report
    let mut report = report.write().unwrap_or_else(PoisonError::into_inner);

    if let Some(json_str) = text.strip_prefix("MEASURE:") {
        let cmd: MeasureCmd = serde_json::from_str(json_str)?;
        let unit: Unit = cmd.unit.parse()?;
        let mut value = MeasuredValue::new(cmd.value, cmd.error, unit);
        if let Some(symbol) = cmd.symbol {
            value = value.with_symbol(symbol);
        }
        info!("Measured {} = {} ± {}", cmd.name, value.as_quantity(), value.error_as_number());
        report.insert(cmd.name, value);
        Ok(vec![report_update(&report)])
    } else if let Some(json_str) = text.strip_prefix("EVALUATE:") {
        let cmd: EvaluateCmd = serde_json::from_str(json_str)?;
        let mut evaluation = Evaluation::new(cmd.expression.as_str())
            .inputs(report.inputs())
            .name(cmd.name.as_str());
        if let Some(symbol) = cmd.symbol {
            evaluation = evaluation.symbol(symbol);
        }
        if let Some(unit) = cmd.fallback_unit {
            evaluation = evaluation.dimensionless_fallback(unit.parse()?);
        }
        let value = evaluation.evaluate()?;
        info!("Evaluated {} -> {}", cmd.expression, value);
        let update = measurement_update(&value);
        report.insert(cmd.name, value);
        Ok(vec![update, report_update(&report)])
    } else if let Some(expression) = text.strip_prefix("FORMULA:") {
        let formula = derive_error_formula(expression)?;
        let payload = json!({
            "expression": expression,
            "formula": formula.to_string(),
            "latex": render_error_formula(&formula),
        });
        Ok(vec![format!("FORMULA_UPDATE:{}", payload)])
    } else if let Some(json_str) = text.strip_prefix("CONVERT:") {
        let cmd: ConvertCmd = serde_json::from_str(json_str)?;
        let target: Unit = cmd.unit.parse()?;
        let value = report
            .get_mut(&cmd.name)
            .ok_or_else(|| CommandError::NotFound(cmd.name.clone()))?;
        value.convert(&target)?;
        info!("Converted {} to '{}'", cmd.name, target);
        Ok(vec![measurement_update(value)])
    } else if let Some(name) = text.strip_prefix("REMOVE:") {
        report
            .remove(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
        info!("Removed {}", name);
        Ok(vec![report_update(&report)])
    } else if text == "REPORT" {
        Ok(vec![format!("REPORT_TEXT:{}", report.render())])
    } else if text == "CLEAR" {
        report.clear();
        info!("Cleared report");
        Ok(vec![report_update(&report)])
    } else {
        Ok(vec![format!("Echo: {}", text)])
    }
}

pub fn report_update(report: &Report) -> String {
    let json = serde_json::to_string(report).unwrap_or("{}".into());
    format!("REPORT_UPDATE:{}", json)
}

fn measurement_update(value: &MeasuredValue) -> String {
    let json = serde_json::to_string(value).unwrap_or("{}".into());
    format!("MEASUREMENT_UPDATE:{}", json)
}
