//! Tracing initialisation
//!
//! Diagnostic logs go to stderr and stay out of the console progress output.
//! `LAUNCHPAD_LOG` takes any `EnvFilter` directive and wins over the flags.

use tracing_subscriber::{prelude::*, EnvFilter};

pub const LOG_ENV: &str = "LAUNCHPAD_LOG";

/// Filter directive used when `LAUNCHPAD_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "launchpad=debug"
    } else {
        "launchpad=warn"
    }
}

/// Initialize tracing. Call once at process startup; later calls are no-ops.
pub fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "launchpad=warn");
        assert_eq!(default_directive(true), "launchpad=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, false);
        init_tracing(true, true);
    }
}
