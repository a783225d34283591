//! Bootstrap orchestration
//!
//! Brings a project to a runnable state and hands off to its service:
//! ensure the environment, activate it, install dependencies, check the
//! configuration file, launch. Steps run strictly in order and every step
//! is a precondition for the next.

pub mod state;

use serde::Serialize;

use crate::config::{BootConfig, InstallPolicy};
use crate::error::{BootError, Result};
use crate::manifest::Manifest;
use crate::platform::{ActivatedEnv, Platform};

pub use state::{BootReport, BootState, Transition};

const STEPS: usize = 5;

/// One step of the launch plan, as shown by `--dry-run`
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub step: usize,
    pub name: &'static str,
    pub action: String,
    /// Whether the step will have no effect on this run
    pub noop: bool,
}

pub struct Orchestrator<P: Platform> {
    config: BootConfig,
    platform: P,
    report: BootReport,
    progress: bool,
}

impl<P: Platform> Orchestrator<P> {
    pub fn new(config: BootConfig, platform: P) -> Self {
        Self {
            config,
            platform,
            report: BootReport::default(),
            progress: true,
        }
    }

    /// Suppress console progress messages (warnings are still printed)
    pub fn quiet(mut self) -> Self {
        self.progress = false;
        self
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    pub fn state(&self) -> BootState {
        self.report.state
    }

    /// Run the whole sequence and return the service's exit code.
    pub fn run(&mut self) -> Result<i32> {
        tracing::info!(
            platform = self.platform.name(),
            project = %self.config.project_dir.display(),
            "starting bootstrap"
        );
        let result = self.run_steps();
        if let Err(ref e) = result {
            tracing::error!(error = %e, kind = ?e.kind(), "bootstrap failed");
            self.report.fail(e.kind());
        }
        result
    }

    fn run_steps(&mut self) -> Result<i32> {
        self.config.validate()?;
        self.ensure_environment()?;
        let env = self.activate();
        self.install_dependencies(&env)?;
        self.validate_config()?;
        self.launch(&env)
    }

    /// Step 1: create the environment directory unless it already exists.
    pub fn ensure_environment(&mut self) -> Result<()> {
        let env_path = self.config.env_path();
        if env_path.is_dir() {
            self.say(1, format!("Using existing virtual environment {}", self.config.env_dir.display()));
            tracing::debug!(path = %env_path.display(), "environment present, skipping creation");
        } else {
            self.say(1, format!("Creating virtual environment {}...", self.config.env_dir.display()));
            self.platform
                .create_environment(&env_path, &self.config.project_dir)?;
            self.report.environment_created = true;
        }
        self.report.advance(BootState::EnvironmentReady);
        Ok(())
    }

    /// Step 2: resolve the execution context used by install and launch.
    pub fn activate(&mut self) -> ActivatedEnv {
        let env = self.platform.activate(&self.config.env_path());
        self.say(2, format!("Activated {}", env.bin_dir.display()));
        self.report.advance(BootState::Activated);
        env
    }

    /// Step 3: install the manifest into the environment, subject to the
    /// configured failure policy.
    pub fn install_dependencies(&mut self, env: &ActivatedEnv) -> Result<()> {
        match self.try_install(env) {
            Ok(()) => {}
            Err(e) => match self.config.install_policy {
                InstallPolicy::Abort => return Err(e),
                InstallPolicy::Continue => {
                    eprintln!("Warning: {}. Continuing without a complete install.", e);
                    tracing::warn!(error = %e, "dependency installation failed, continuing");
                    self.report.install_warning = Some(e.to_string());
                }
            },
        }
        self.report.advance(BootState::DependenciesInstalled);
        Ok(())
    }

    fn try_install(&self, env: &ActivatedEnv) -> Result<()> {
        let manifest_path = self.config.manifest_path();
        let manifest = Manifest::load(&manifest_path)?;
        if manifest.is_empty() {
            self.say(3, format!("No dependencies declared in {}", self.config.manifest.display()));
            return Ok(());
        }

        self.say(
            3,
            format!(
                "Installing {} dependencies from {}...",
                manifest.entries.len(),
                self.config.manifest.display()
            ),
        );
        tracing::debug!(packages = ?manifest.package_names(), "installing");
        self.platform
            .run_installer(env, &manifest_path, &self.config.project_dir)
    }

    /// Step 4: the configuration file must exist. Its contents are never read.
    pub fn validate_config(&mut self) -> Result<()> {
        let path = self.config.config_path();
        self.say(4, format!("Checking configuration file {}", self.config.config_file.display()));
        if !path.exists() {
            eprintln!(
                "Warning: {} not found. Create it and configure the database connection before starting the service.",
                self.config.config_file.display()
            );
            return Err(BootError::ConfigMissing { path });
        }
        self.report.advance(BootState::ConfigValidated);
        Ok(())
    }

    /// Step 5: run the service in the foreground until it exits.
    pub fn launch(&mut self, env: &ActivatedEnv) -> Result<i32> {
        let service = &self.config.service;
        self.say(
            5,
            format!(
                "Starting {} on {}{}",
                service.app,
                service.address(),
                if service.reload { " (reload enabled)" } else { "" }
            ),
        );
        self.report.advance(BootState::Running);
        let code = self
            .platform
            .start_service(env, service, &self.config.project_dir)?;
        tracing::info!(code, "service exited");
        Ok(code)
    }

    /// Describe what `run` would do without doing it
    pub fn plan(&self) -> Vec<PlannedStep> {
        let env_path = self.config.env_path();
        let env_exists = env_path.is_dir();
        let env = self.platform.activate(&env_path);
        let service = &self.config.service;

        let install = match Manifest::load(&self.config.manifest_path()) {
            Ok(m) if m.is_empty() => (
                format!("no dependencies declared in {}", self.config.manifest.display()),
                true,
            ),
            Ok(m) => (
                format!(
                    "{} -m pip install -r {} ({} entries)",
                    env.python.display(),
                    self.config.manifest.display(),
                    m.entries.len()
                ),
                false,
            ),
            Err(e) => (format!("{} (policy: {})", e, self.config.install_policy), true),
        };

        let config_present = self.config.config_path().exists();

        vec![
            PlannedStep {
                step: 1,
                name: "ensure-environment",
                action: if env_exists {
                    format!("reuse {}", env_path.display())
                } else {
                    format!("create virtual environment at {}", env_path.display())
                },
                noop: env_exists,
            },
            PlannedStep {
                step: 2,
                name: "activate",
                action: format!("prefer binaries from {}", env.bin_dir.display()),
                noop: false,
            },
            PlannedStep {
                step: 3,
                name: "install-dependencies",
                action: install.0,
                noop: install.1,
            },
            PlannedStep {
                step: 4,
                name: "validate-config",
                action: if config_present {
                    format!("{} present", self.config.config_file.display())
                } else {
                    format!("{} missing, bootstrap will stop here", self.config.config_file.display())
                },
                noop: false,
            },
            PlannedStep {
                step: 5,
                name: "launch-service",
                action: format!("{} -m {}", env.python.display(), service.args().join(" ")),
                noop: !config_present,
            },
        ]
    }

    fn say(&self, step: usize, message: String) {
        if self.progress {
            println!("[{}/{}] {}", step, STEPS, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceSpec;
    use crate::error::ErrorKind;
    use crate::platform::EnvLayout;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(PathBuf),
        Activate(PathBuf),
        Install(PathBuf),
        Start(ServiceSpec),
    }

    /// Records every capability call instead of spawning processes
    #[derive(Default)]
    struct RecordingPlatform {
        calls: RefCell<Vec<Call>>,
        fail_create: Option<i32>,
        fail_install: Option<i32>,
        service_exit: i32,
    }

    impl RecordingPlatform {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn created(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, Call::Create(_))).count()
        }

        fn installed(&self) -> bool {
            self.calls().iter().any(|c| matches!(c, Call::Install(_)))
        }

        fn started(&self) -> bool {
            self.calls().iter().any(|c| matches!(c, Call::Start(_)))
        }
    }

    impl Platform for RecordingPlatform {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn create_environment(&self, env_dir: &Path, _cwd: &Path) -> Result<()> {
            self.calls.borrow_mut().push(Call::Create(env_dir.to_path_buf()));
            if let Some(code) = self.fail_create {
                return Err(BootError::EnvironmentCreation {
                    path: env_dir.to_path_buf(),
                    detail: "no interpreter".to_string(),
                    code,
                });
            }
            fs::create_dir_all(env_dir.join("bin"))?;
            Ok(())
        }

        fn activate(&self, env_dir: &Path) -> ActivatedEnv {
            self.calls.borrow_mut().push(Call::Activate(env_dir.to_path_buf()));
            ActivatedEnv::new(env_dir, &EnvLayout::POSIX, None)
        }

        fn run_installer(&self, _env: &ActivatedEnv, manifest: &Path, _cwd: &Path) -> Result<()> {
            self.calls.borrow_mut().push(Call::Install(manifest.to_path_buf()));
            match self.fail_install {
                Some(code) => Err(BootError::DependencyInstall {
                    detail: "pip exited".to_string(),
                    code,
                }),
                None => Ok(()),
            }
        }

        fn start_service(&self, _env: &ActivatedEnv, service: &ServiceSpec, _cwd: &Path) -> Result<i32> {
            self.calls.borrow_mut().push(Call::Start(service.clone()));
            Ok(self.service_exit)
        }
    }

    fn project(manifest: Option<&str>, config: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        if let Some(content) = manifest {
            fs::write(dir.path().join("requirements.txt"), content).unwrap();
        }
        if config {
            fs::write(dir.path().join(".env"), "DATABASE_URL=postgresql://localhost/app\n").unwrap();
        }
        dir
    }

    fn orchestrator(dir: &Path, platform: RecordingPlatform) -> Orchestrator<RecordingPlatform> {
        Orchestrator::new(BootConfig::for_project(dir), platform).quiet()
    }

    #[test]
    fn test_fresh_project_runs_to_service() {
        let dir = project(Some("fastapi\nuvicorn\n"), true);
        let platform = RecordingPlatform {
            service_exit: 3,
            ..Default::default()
        };
        let mut orch = orchestrator(dir.path(), platform);

        let code = orch.run().unwrap();
        assert_eq!(code, 3);
        assert_eq!(orch.state(), BootState::Running);
        assert!(orch.report().environment_created);
        assert!(dir.path().join("venv").is_dir());

        let calls = orch.platform().calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Create(dir.path().join("venv")));
        assert_eq!(calls[1], Call::Activate(dir.path().join("venv")));
        assert_eq!(calls[2], Call::Install(dir.path().join("requirements.txt")));
        assert_eq!(calls[3], Call::Start(ServiceSpec::default()));
    }

    #[test]
    fn test_existing_environment_is_not_recreated() {
        let dir = project(Some("fastapi\n"), true);
        fs::create_dir(dir.path().join("venv")).unwrap();
        fs::write(dir.path().join("venv").join("marker"), "keep").unwrap();

        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());
        orch.run().unwrap();
        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());
        orch.run().unwrap();

        assert_eq!(orch.platform().created(), 0);
        assert!(!orch.report().environment_created);
        assert!(dir.path().join("venv").join("marker").exists());
    }

    #[test]
    fn test_second_run_reuses_created_environment() {
        let dir = project(Some("fastapi\n"), true);

        let mut first = orchestrator(dir.path(), RecordingPlatform::default());
        first.run().unwrap();
        assert_eq!(first.platform().created(), 1);

        let mut second = orchestrator(dir.path(), RecordingPlatform::default());
        second.run().unwrap();
        assert_eq!(second.platform().created(), 0);
    }

    #[test]
    fn test_missing_config_stops_before_launch() {
        let dir = project(Some("fastapi\n"), false);
        fs::create_dir(dir.path().join("venv")).unwrap();
        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());

        let err = orch.run().unwrap_err();
        assert!(matches!(err, BootError::ConfigMissing { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG_MISSING);
        assert_eq!(orch.state(), BootState::Failed(ErrorKind::ConfigMissing));
        assert!(!orch.platform().started());
    }

    #[test]
    fn test_environment_failure_aborts_everything() {
        let dir = project(Some("fastapi\n"), true);
        let platform = RecordingPlatform {
            fail_create: Some(127),
            ..Default::default()
        };
        let mut orch = orchestrator(dir.path(), platform);

        let err = orch.run().unwrap_err();
        assert_eq!(err.exit_code(), 127);
        assert_eq!(orch.state(), BootState::Failed(ErrorKind::EnvironmentCreation));
        assert_eq!(orch.platform().calls().len(), 1);
        assert!(!orch.platform().installed());
        assert!(!orch.platform().started());
    }

    #[test]
    fn test_install_failure_continues_by_default() {
        let dir = project(Some("fastapi\n"), true);
        let platform = RecordingPlatform {
            fail_install: Some(1),
            ..Default::default()
        };
        let mut orch = orchestrator(dir.path(), platform);

        assert_eq!(orch.run().unwrap(), 0);
        assert!(orch.platform().started());
        assert!(orch.report().install_warning.is_some());
    }

    #[test]
    fn test_install_failure_aborts_with_policy() {
        let dir = project(Some("fastapi\n"), true);
        let platform = RecordingPlatform {
            fail_install: Some(2),
            ..Default::default()
        };
        let mut config = BootConfig::for_project(dir.path());
        config.install_policy = InstallPolicy::Abort;
        let mut orch = Orchestrator::new(config, platform).quiet();

        let err = orch.run().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(orch.state(), BootState::Failed(ErrorKind::DependencyInstall));
        assert!(!orch.platform().started());
    }

    #[test]
    fn test_missing_manifest_follows_policy() {
        let dir = project(None, true);
        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());
        orch.run().unwrap();
        assert!(!orch.platform().installed());
        assert!(orch.platform().started());
        assert!(orch.report().install_warning.is_some());
    }

    #[test]
    fn test_non_utf8_manifest_still_installs() {
        for policy in [InstallPolicy::Continue, InstallPolicy::Abort] {
            let dir = project(None, true);
            fs::write(dir.path().join("requirements.txt"), b"fastapi\n# caf\xe9\n").unwrap();
            let mut config = BootConfig::for_project(dir.path());
            config.install_policy = policy;
            let mut orch = Orchestrator::new(config, RecordingPlatform::default()).quiet();

            assert_eq!(orch.run().unwrap(), 0);
            assert!(orch.platform().installed());
            assert!(orch.report().install_warning.is_none());
        }
    }

    #[test]
    fn test_config_check_is_existence_only() {
        let dir = project(Some("fastapi\n"), false);
        fs::create_dir(dir.path().join(".env")).unwrap();
        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());

        orch.run().unwrap();
        assert!(orch.platform().started());
    }

    #[test]
    fn test_empty_manifest_skips_installer() {
        let dir = project(Some("# nothing\n"), true);
        let mut orch = orchestrator(dir.path(), RecordingPlatform::default());
        orch.run().unwrap();
        assert!(!orch.platform().installed());
        assert!(orch.report().install_warning.is_none());
    }

    #[test]
    fn test_service_always_gets_fixed_address() {
        for _ in 0..2 {
            let dir = project(Some("fastapi\n"), true);
            let mut orch = orchestrator(dir.path(), RecordingPlatform::default());
            orch.run().unwrap();
            let start = orch
                .platform()
                .calls()
                .into_iter()
                .find_map(|c| match c {
                    Call::Start(spec) => Some(spec),
                    _ => None,
                })
                .unwrap();
            assert_eq!(start.address(), "0.0.0.0:8000");
            assert!(start.reload);
        }
    }

    #[test]
    fn test_invalid_config_fails_before_any_step() {
        let dir = project(Some("fastapi\n"), true);
        let mut config = BootConfig::for_project(dir.path());
        config.service.port = 0;
        let mut orch = Orchestrator::new(config, RecordingPlatform::default()).quiet();

        let err = orch.run().unwrap_err();
        assert!(matches!(err, BootError::InvalidConfig(_)));
        assert!(orch.platform().calls().is_empty());
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let dir = project(Some("fastapi\nuvicorn\n"), false);
        let orch = orchestrator(dir.path(), RecordingPlatform::default());
        let plan = orch.plan();

        assert_eq!(plan.len(), 5);
        assert!(!plan[0].noop);
        assert!(plan[2].action.contains("2 entries"));
        assert!(plan[3].action.contains("missing"));
        assert!(plan[4].noop);
        assert!(plan[4].action.contains("--port 8000"));
        assert!(!dir.path().join("venv").exists());
        assert_eq!(orch.platform().created(), 0);
    }
}
