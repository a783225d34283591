//! Platform abstraction
//!
//! The bootstrap sequence only needs four capabilities from the host:
//! creating an environment, activating it, running the package installer
//! and starting the service. [`Platform`] captures them so the orchestrator
//! stays identical across operating systems and can be driven by a fake in
//! tests.
//!
//! Activation never touches the launcher's own process environment. It
//! yields an [`ActivatedEnv`] value that the install and launch steps use to
//! build their commands.

pub mod layout;
pub mod system;

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::config::ServiceSpec;
use crate::error::Result;

pub use layout::EnvLayout;
pub use system::SystemPlatform;

/// Host capabilities used by the orchestrator
pub trait Platform {
    /// Short adapter name for logs
    fn name(&self) -> &'static str;

    /// Create an isolated environment at `env_dir`.
    fn create_environment(&self, env_dir: &Path, cwd: &Path) -> Result<()>;

    /// Resolve the execution context that prefers the environment's binaries.
    fn activate(&self, env_dir: &Path) -> ActivatedEnv;

    /// Install the manifest's packages into the activated environment.
    fn run_installer(&self, env: &ActivatedEnv, manifest: &Path, cwd: &Path) -> Result<()>;

    /// Run the service in the foreground and return its exit code.
    fn start_service(&self, env: &ActivatedEnv, service: &ServiceSpec, cwd: &Path) -> Result<i32>;
}

/// Execution context of an activated environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivatedEnv {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub python: PathBuf,
    /// PATH value with the environment's bin directory first
    #[serde(skip)]
    pub path_var: OsString,
}

impl ActivatedEnv {
    pub fn new(root: &Path, layout: &EnvLayout, inherited_path: Option<OsString>) -> Self {
        let bin_dir = layout.bin_dir(root);
        let python = layout.python(root);

        let mut dirs = vec![bin_dir.clone()];
        if let Some(path) = inherited_path.as_deref() {
            dirs.extend(std::env::split_paths(path));
        }
        let path_var = std::env::join_paths(&dirs).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "inherited PATH could not be joined, using environment bin dir only");
            bin_dir.clone().into_os_string()
        });

        Self {
            root: root.to_path_buf(),
            bin_dir,
            python,
            path_var,
        }
    }

    /// Activate using the launcher's own PATH as the inherited search path.
    pub fn from_current_path(root: &Path, layout: &EnvLayout) -> Self {
        Self::new(root, layout, std::env::var_os("PATH"))
    }

    /// Build a command that runs inside the environment.
    pub fn command(&self, program: impl AsRef<OsStr>) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("PATH", &self.path_var)
            .env("VIRTUAL_ENV", &self.root)
            .env_remove("PYTHONHOME");
        cmd
    }

    /// Command running the environment's interpreter.
    pub fn python_command(&self) -> Command {
        self.command(&self.python)
    }
}
