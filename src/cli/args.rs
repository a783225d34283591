//! CLI argument parsing
//!
//! Every flag is optional. Running `launchpad` with no arguments bootstraps
//! the current directory with the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    BootConfig, InstallPolicy, ServiceSpec, DEFAULT_APP, DEFAULT_CONFIG_FILE, DEFAULT_ENV_DIR,
    DEFAULT_HOST, DEFAULT_MANIFEST, DEFAULT_PORT, DEFAULT_SERVER,
};

#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(author, version, about = "Prepare a project's virtual environment and start its service", long_about = None)]
pub struct Args {
    /// Project directory all other paths are relative to
    #[arg(long, env = "LAUNCHPAD_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Virtual environment directory
    #[arg(long, env = "LAUNCHPAD_ENV_DIR", default_value = DEFAULT_ENV_DIR)]
    pub env_dir: PathBuf,

    /// Dependency manifest passed to the installer
    #[arg(long, env = "LAUNCHPAD_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Configuration file that must exist before the service starts
    #[arg(long, env = "LAUNCHPAD_CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Base interpreter used to create the environment (default: python3, then python)
    #[arg(long, env = "LAUNCHPAD_PYTHON")]
    pub python: Option<PathBuf>,

    /// Server module run inside the environment
    #[arg(long, env = "LAUNCHPAD_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Application target handed to the server
    #[arg(long, env = "LAUNCHPAD_APP", default_value = DEFAULT_APP)]
    pub app: String,

    /// Bind address
    #[arg(long, env = "LAUNCHPAD_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Bind port
    #[arg(long, env = "LAUNCHPAD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Disable reload-on-change
    #[arg(long)]
    pub no_reload: bool,

    /// What to do when dependency installation fails (continue, abort)
    #[arg(long, env = "LAUNCHPAD_INSTALL_POLICY", default_value_t = InstallPolicy::Continue)]
    pub install_policy: InstallPolicy,

    /// Show the launch plan without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output the plan and failure report as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit diagnostic logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Build the bootstrap configuration rooted at `project_dir`
    pub fn to_config(&self, project_dir: PathBuf) -> BootConfig {
        BootConfig {
            project_dir,
            env_dir: self.env_dir.clone(),
            manifest: self.manifest.clone(),
            config_file: self.config_file.clone(),
            base_python: self.python.clone(),
            service: ServiceSpec {
                server: self.server.clone(),
                app: self.app.clone(),
                host: self.host.clone(),
                port: self.port,
                reload: !self.no_reload,
            },
            install_policy: self.install_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_gives_defaults() {
        let args = Args::try_parse_from(["launchpad"]).unwrap();
        let config = args.to_config(PathBuf::from("."));
        assert_eq!(config, BootConfig::default());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "launchpad",
            "--port",
            "9000",
            "--no-reload",
            "--install-policy",
            "abort",
            "--config-file",
            "settings.env",
        ])
        .unwrap();
        let config = args.to_config(PathBuf::from("/srv/app"));
        assert_eq!(config.service.port, 9000);
        assert!(!config.service.reload);
        assert_eq!(config.install_policy, InstallPolicy::Abort);
        assert_eq!(config.config_path(), PathBuf::from("/srv/app/settings.env"));
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(Args::try_parse_from(["launchpad", "--install-policy", "retry"]).is_err());
    }
}
