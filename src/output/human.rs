//! Human-readable output formatting

use crate::orchestrator::{BootReport, PlannedStep};

pub fn format_plan_human(plan: &[PlannedStep]) -> String {
    let mut output = String::from("Launch Plan\n-----------\n");
    for step in plan {
        output.push_str(&format!(
            "{}. {:<22} {}{}\n",
            step.step,
            step.name,
            step.action,
            if step.noop { "  [no-op]" } else { "" }
        ));
    }
    output
}

pub fn format_report_human(report: &BootReport) -> String {
    let mut output = format!(
        "Bootstrap Summary\n\
         -----------------\n\
         Started:     {}\n\
         Final state: {}\n\
         Env created: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.state,
        if report.environment_created { "yes" } else { "no" }
    );
    if let Some(ref warning) = report.install_warning {
        output.push_str(&format!("Install:     {}\n", warning));
    }
    for t in &report.transitions {
        output.push_str(&format!("  {} {} -> {}\n", t.at.format("%H:%M:%S%.3f"), t.from, t.to));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::BootState;

    #[test]
    fn test_plan_marks_noop() {
        let plan = vec![
            PlannedStep {
                step: 1,
                name: "ensure-environment",
                action: "reuse venv".to_string(),
                noop: true,
            },
            PlannedStep {
                step: 5,
                name: "launch-service",
                action: "venv/bin/python -m uvicorn main:app".to_string(),
                noop: false,
            },
        ];
        let text = format_plan_human(&plan);
        assert!(text.starts_with("Launch Plan"));
        assert!(text.contains("reuse venv  [no-op]"));
        assert!(!text.contains("main:app  [no-op]"));
    }

    #[test]
    fn test_report_lists_transitions() {
        let mut report = BootReport::default();
        report.advance(BootState::EnvironmentReady);
        let text = format_report_human(&report);
        assert!(text.contains("Final state: environment ready"));
        assert!(text.contains("init -> environment ready"));
    }
}
