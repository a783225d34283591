//! Launchpad - bootstrap a project's virtual environment and start its service
//!
//! Launchpad makes sure a project's virtual environment exists, installs the
//! declared dependencies into it, checks that the configuration file is in
//! place and then runs the backend service in the foreground.
//!
//! # Example
//!
//! ```no_run
//! use launchpad::{BootConfig, Orchestrator, SystemPlatform};
//!
//! let config = BootConfig::for_project("/srv/app");
//! let platform = SystemPlatform::detect(None);
//! let code = Orchestrator::new(config, platform).run().unwrap();
//! std::process::exit(code);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod observability;
pub mod orchestrator;
pub mod output;
pub mod platform;
pub mod process;

pub use config::{BootConfig, InstallPolicy, ServiceSpec};
pub use error::{BootError, ErrorKind, Result};
pub use manifest::{Manifest, ManifestEntry};
pub use orchestrator::{BootReport, BootState, Orchestrator, PlannedStep};
pub use output::{format_plan, format_report, OutputFormat};
pub use platform::{ActivatedEnv, EnvLayout, Platform, SystemPlatform};
