//! Child process execution

use std::io;
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND};

static INTERRUPT_HANDLER: AtomicBool = AtomicBool::new(false);
/// PID of the running foreground service, 0 when none
static SERVICE_PID: AtomicU32 = AtomicU32::new(0);

/// Render a command line for progress and log output
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}

/// Run a command with inherited stdio and wait for it to finish.
pub fn run_blocking(cmd: &mut Command) -> io::Result<ExitStatus> {
    tracing::debug!(command = %describe(cmd), "spawning");
    let status = cmd.status()?;
    tracing::debug!(command = %describe(cmd), code = exit_code(&status), "exited");
    Ok(status)
}

/// Run the service in the foreground.
///
/// On unix the service gets its own process group, so an interrupt reaches
/// it exactly once: the launcher catches SIGINT (from the terminal or sent
/// to its PID alone) and forwards it, then waits and returns the service's
/// status.
pub fn run_foreground(cmd: &mut Command) -> io::Result<ExitStatus> {
    if !INTERRUPT_HANDLER.swap(true, Ordering::SeqCst) {
        if let Err(e) = ctrlc::set_handler(forward_interrupt) {
            tracing::warn!(error = %e, "could not install interrupt handler");
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    tracing::debug!(command = %describe(cmd), "spawning service");
    let mut child = cmd.spawn()?;
    SERVICE_PID.store(child.id(), Ordering::SeqCst);
    let status = child.wait();
    SERVICE_PID.store(0, Ordering::SeqCst);

    let status = status?;
    tracing::debug!(code = exit_code(&status), "service exited");
    Ok(status)
}

fn forward_interrupt() {
    let pid = SERVICE_PID.load(Ordering::SeqCst);
    if pid == 0 {
        return;
    }
    tracing::debug!(pid, "forwarding interrupt to service");
    #[cfg(unix)]
    {
        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
        if rc != 0 {
            tracing::warn!(pid, error = %io::Error::last_os_error(), "could not forward interrupt");
        }
    }
}

/// Map an exit status to the code the launcher exits with.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Map a spawn error to a shell-style exit code.
pub fn spawn_error_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut cmd = Command::new("python");
        cmd.args(["-m", "pip", "install"]);
        assert_eq!(describe(&cmd), "python -m pip install");
    }

    #[test]
    fn test_spawn_error_codes() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert_eq!(spawn_error_code(&not_found), 127);
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(spawn_error_code(&denied), 126);
        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(spawn_error_code(&other), 1);
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let err = run_blocking(&mut Command::new("launchpad-definitely-missing-binary")).unwrap_err();
        assert_eq!(spawn_error_code(&err), 127);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_propagated() {
        let status = run_blocking(Command::new("sh").args(["-c", "exit 7"])).unwrap();
        assert_eq!(exit_code(&status), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_foreground_returns_child_status() {
        let status = run_foreground(Command::new("sh").args(["-c", "exit 5"])).unwrap();
        assert_eq!(exit_code(&status), 5);
        assert_eq!(SERVICE_PID.load(Ordering::SeqCst), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code() {
        use std::os::unix::process::ExitStatusExt;
        let status = ExitStatus::from_raw(15);
        assert_eq!(exit_code(&status), 128 + 15);
    }
}
