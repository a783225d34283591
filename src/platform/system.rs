//! Platform adapter backed by real processes

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ServiceSpec;
use crate::error::{BootError, Result, EXIT_NOT_FOUND};
use crate::platform::{ActivatedEnv, EnvLayout, Platform};
use crate::process::{self, exit_code, spawn_error_code};

/// Runs `python -m venv`, `pip` and the service as child processes
#[derive(Debug, Clone)]
pub struct SystemPlatform {
    layout: EnvLayout,
    base_python: Option<PathBuf>,
}

impl SystemPlatform {
    pub fn new(layout: EnvLayout, base_python: Option<PathBuf>) -> Self {
        Self {
            layout,
            base_python,
        }
    }

    /// Adapter for the host OS
    pub fn detect(base_python: Option<PathBuf>) -> Self {
        Self::new(EnvLayout::host(), base_python)
    }

    pub fn layout(&self) -> &EnvLayout {
        &self.layout
    }

    /// Find the interpreter used to create the environment.
    pub fn locate_base_python(&self) -> Option<PathBuf> {
        match &self.base_python {
            Some(python) if python.components().count() > 1 => {
                python.is_file().then(|| python.clone())
            }
            Some(python) => which::which(python).ok(),
            None => self
                .layout
                .base_candidates
                .iter()
                .find_map(|name| which::which(name).ok()),
        }
    }
}

impl Platform for SystemPlatform {
    fn name(&self) -> &'static str {
        self.layout.name
    }

    fn create_environment(&self, env_dir: &Path, cwd: &Path) -> Result<()> {
        let python = self
            .locate_base_python()
            .ok_or_else(|| BootError::EnvironmentCreation {
                path: env_dir.to_path_buf(),
                detail: match &self.base_python {
                    Some(p) => format!("interpreter {} not found", p.display()),
                    None => format!(
                        "no base interpreter found on PATH (tried {})",
                        self.layout.base_candidates.join(", ")
                    ),
                },
                code: EXIT_NOT_FOUND,
            })?;

        let mut cmd = Command::new(&python);
        cmd.arg("-m").arg("venv").arg(env_dir).current_dir(cwd);

        let status = process::run_blocking(&mut cmd).map_err(|e| BootError::EnvironmentCreation {
            path: env_dir.to_path_buf(),
            detail: format!("{}: {}", process::describe(&cmd), e),
            code: spawn_error_code(&e),
        })?;

        if !status.success() {
            return Err(BootError::EnvironmentCreation {
                path: env_dir.to_path_buf(),
                detail: format!("{} exited with {}", process::describe(&cmd), status),
                code: exit_code(&status),
            });
        }
        Ok(())
    }

    fn activate(&self, env_dir: &Path) -> ActivatedEnv {
        ActivatedEnv::from_current_path(env_dir, &self.layout)
    }

    fn run_installer(&self, env: &ActivatedEnv, manifest: &Path, cwd: &Path) -> Result<()> {
        let mut cmd = env.python_command();
        cmd.args(["-m", "pip", "install", "-r"])
            .arg(manifest)
            .current_dir(cwd);

        let status = process::run_blocking(&mut cmd).map_err(|e| BootError::DependencyInstall {
            detail: format!("{}: {}", process::describe(&cmd), e),
            code: spawn_error_code(&e),
        })?;

        if !status.success() {
            return Err(BootError::DependencyInstall {
                detail: format!("pip exited with {}", status),
                code: exit_code(&status),
            });
        }
        Ok(())
    }

    fn start_service(&self, env: &ActivatedEnv, service: &ServiceSpec, cwd: &Path) -> Result<i32> {
        let mut cmd = env.python_command();
        cmd.arg("-m").args(service.args()).current_dir(cwd);

        let status = process::run_foreground(&mut cmd).map_err(|e| BootError::ServiceLaunch {
            detail: format!("{}: {}", process::describe(&cmd), e),
            code: spawn_error_code(&e),
        })?;
        Ok(exit_code(&status))
    }
}
