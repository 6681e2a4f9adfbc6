mod harness;
mod report;

pub use harness::{evaluate_all, evaluate_tracker, report_from};
pub use report::EvaluationReport;
