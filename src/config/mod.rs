//! Launcher configuration
//!
//! Every parameter of the bootstrap sequence lives in [`BootConfig`]. The
//! defaults reproduce the fixed behaviour of the original start scripts;
//! the CLI and tests may override individual fields.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{BootError, Result};

/// Default virtual environment directory, relative to the project.
pub const DEFAULT_ENV_DIR: &str = "venv";
/// Default dependency manifest, relative to the project.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
/// Default configuration file whose presence gates startup.
pub const DEFAULT_CONFIG_FILE: &str = ".env";
/// Default server module run inside the environment.
pub const DEFAULT_SERVER: &str = "uvicorn";
/// Default application target handed to the server.
pub const DEFAULT_APP: &str = "main:app";
/// Wildcard bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// What to do when the dependency installer reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallPolicy {
    /// Warn and carry on to the configuration check
    #[default]
    Continue,
    /// Stop the bootstrap with the installer's exit status
    Abort,
}

impl FromStr for InstallPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continue" => Ok(InstallPolicy::Continue),
            "abort" => Ok(InstallPolicy::Abort),
            other => Err(format!(
                "unknown install policy '{}' (expected 'continue' or 'abort')",
                other
            )),
        }
    }
}

impl fmt::Display for InstallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallPolicy::Continue => write!(f, "continue"),
            InstallPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// Network and process parameters of the launched service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    /// Module run with `python -m`
    pub server: String,
    /// Application target, e.g. `main:app`
    pub app: String,
    pub host: String,
    pub port: u16,
    /// Restart the service when source files change
    pub reload: bool,
}

impl Default for ServiceSpec {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            app: DEFAULT_APP.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            reload: true,
        }
    }
}

impl ServiceSpec {
    /// Arguments passed after `python -m`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.server.clone(),
            self.app.clone(),
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ];
        if self.reload {
            args.push("--reload".to_string());
        }
        args
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Make `path` absolute without resolving symlinks or adding a verbatim
/// `\\?\` prefix on Windows. The directory must exist.
pub fn resolve_project_dir(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    if !absolute.is_dir() {
        return Err(BootError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", absolute.display()),
        )));
    }
    Ok(absolute)
}

/// Complete bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootConfig {
    /// Directory all relative paths resolve against
    pub project_dir: PathBuf,
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub config_file: PathBuf,
    /// Base interpreter used to create the environment; looked up on PATH when unset
    pub base_python: Option<PathBuf>,
    pub service: ServiceSpec,
    pub install_policy: InstallPolicy,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            env_dir: PathBuf::from(DEFAULT_ENV_DIR),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            base_python: None,
            service: ServiceSpec::default(),
            install_policy: InstallPolicy::default(),
        }
    }
}

impl BootConfig {
    /// Default configuration rooted at `project_dir`
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    pub fn env_path(&self) -> PathBuf {
        self.resolve(&self.env_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn config_path(&self) -> PathBuf {
        self.resolve(&self.config_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Reject settings the service could never start with
    pub fn validate(&self) -> Result<()> {
        if self.service.port == 0 {
            return Err(BootError::InvalidConfig("port must be non-zero".to_string()));
        }
        if self.service.host.trim().is_empty() {
            return Err(BootError::InvalidConfig("host must not be empty".to_string()));
        }
        if self.service.server.trim().is_empty() || self.service.app.trim().is_empty() {
            return Err(BootError::InvalidConfig(
                "server module and application target must not be empty".to_string(),
            ));
        }
        if self.env_dir.as_os_str().is_empty() {
            return Err(BootError::InvalidConfig(
                "environment directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
