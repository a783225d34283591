//! Output formatting

use crate::orchestrator::{BootReport, PlannedStep};
use crate::output::human::{format_plan_human, format_report_human};
use crate::output::json::{format_plan_json, format_report_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub fn format_plan(plan: &[PlannedStep], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_plan_human(plan),
        OutputFormat::Json => format_plan_json(plan),
    }
}

pub fn format_report(report: &BootReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_report_human(report),
        OutputFormat::Json => format_report_json(report),
    }
}
