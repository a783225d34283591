//! Error types for Launchpad

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Exit status used when the configuration file is missing (sysexits `EX_CONFIG`).
pub const EXIT_CONFIG_MISSING: i32 = 78;
/// Exit status for invalid launcher settings (sysexits `EX_USAGE`).
pub const EXIT_INVALID_CONFIG: i32 = 64;
/// Exit status for local I/O failures (sysexits `EX_IOERR`).
pub const EXIT_IO: i32 = 74;
/// Exit status when a required program could not be found, as a shell reports it.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status when a program exists but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

#[derive(Error, Debug)]
pub enum BootError {
    #[error("Failed to create virtual environment at {path}: {detail}")]
    EnvironmentCreation {
        path: PathBuf,
        detail: String,
        code: i32,
    },

    #[error("Dependency installation failed: {detail}")]
    DependencyInstall { detail: String, code: i32 },

    #[error("Configuration file not found: {path}")]
    ConfigMissing { path: PathBuf },

    #[error("Failed to launch service: {detail}")]
    ServiceLaunch { detail: String, code: i32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of a [`BootError`], used by the state machine and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EnvironmentCreation,
    DependencyInstall,
    ConfigMissing,
    ServiceLaunch,
    InvalidConfig,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::EnvironmentCreation => "environment_creation",
            ErrorKind::DependencyInstall => "dependency_install",
            ErrorKind::ConfigMissing => "config_missing",
            ErrorKind::ServiceLaunch => "service_launch",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Io => "io",
        };
        write!(f, "{}", name)
    }
}

impl BootError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BootError::EnvironmentCreation { .. } => ErrorKind::EnvironmentCreation,
            BootError::DependencyInstall { .. } => ErrorKind::DependencyInstall,
            BootError::ConfigMissing { .. } => ErrorKind::ConfigMissing,
            BootError::ServiceLaunch { .. } => ErrorKind::ServiceLaunch,
            BootError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            BootError::Io(_) => ErrorKind::Io,
        }
    }

    /// Process exit status the launcher terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootError::EnvironmentCreation { code, .. }
            | BootError::DependencyInstall { code, .. }
            | BootError::ServiceLaunch { code, .. } => *code,
            BootError::ConfigMissing { .. } => EXIT_CONFIG_MISSING,
            BootError::InvalidConfig(_) => EXIT_INVALID_CONFIG,
            BootError::Io(_) => EXIT_IO,
        }
    }
}

pub type Result<T> = std::result::Result<T, BootError>;
