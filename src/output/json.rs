//! JSON output formatting

use crate::orchestrator::{BootReport, PlannedStep};
use serde_json::json;

pub fn format_plan_json(plan: &[PlannedStep]) -> String {
    let data = json!({ "steps": plan });
    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_report_json(report: &BootReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
