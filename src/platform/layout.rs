//! Virtual environment directory layouts

use std::path::{Path, PathBuf};

/// Where an environment keeps its executables on a given OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvLayout {
    pub name: &'static str,
    /// Executable directory inside the environment
    pub bin: &'static str,
    /// Interpreter file name inside `bin`
    pub interpreter: &'static str,
    /// Base interpreter names tried on PATH, in order
    pub base_candidates: &'static [&'static str],
}

impl EnvLayout {
    pub const POSIX: EnvLayout = EnvLayout {
        name: "posix",
        bin: "bin",
        interpreter: "python",
        base_candidates: &["python3", "python"],
    };

    pub const WINDOWS: EnvLayout = EnvLayout {
        name: "windows",
        bin: "Scripts",
        interpreter: "python.exe",
        base_candidates: &["python", "python3"],
    };

    /// Layout of the host the launcher runs on
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::WINDOWS
        } else {
            Self::POSIX
        }
    }

    pub fn bin_dir(&self, env_dir: &Path) -> PathBuf {
        env_dir.join(self.bin)
    }

    pub fn python(&self, env_dir: &Path) -> PathBuf {
        self.bin_dir(env_dir).join(self.interpreter)
    }
}
