pub mod units;
pub mod algebra;
pub mod measurement;
pub mod report;

pub fn version() -> &'static str {
    "0.1.0"
}
