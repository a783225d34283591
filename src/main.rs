//! Launchpad CLI - bootstrap a project and start its service

use anyhow::Context;
use clap::Parser;
use launchpad::cli::Args;
use launchpad::config::resolve_project_dir;
use launchpad::{
    format_plan, format_report, observability, BootError, Orchestrator, OutputFormat, SystemPlatform,
};

fn main() {
    let args = Args::parse();
    observability::init_tracing(args.verbose, args.log_json);

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e.downcast_ref::<BootError>().map_or(1, BootError::exit_code);
            std::process::exit(code);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let project_dir = resolve_project_dir(&args.project_dir)
        .with_context(|| format!("project directory {}", args.project_dir.display()))?;

    let config = args.to_config(project_dir);
    let platform = SystemPlatform::detect(config.base_python.clone());
    let format = if args.json { OutputFormat::Json } else { OutputFormat::Human };
    let mut orchestrator = Orchestrator::new(config, platform);

    if args.dry_run {
        println!("{}", format_plan(&orchestrator.plan(), &format));
        return Ok(0);
    }

    let result = orchestrator.run();
    if result.is_err() {
        let report = format_report(orchestrator.report(), &format);
        if args.json {
            println!("{}", report);
        } else if args.verbose {
            eprintln!("{}", report);
        }
    }
    result.context("bootstrap failed")
}
