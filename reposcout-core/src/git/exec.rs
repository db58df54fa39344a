//! Shell command execution for git operations
//!
//! Lifecycle code only builds command strings. Running them, and deciding
//! what a failure means for the whole process, is the job of a
//! [`CommandExecutor`].

use std::process::{Command, Output, Stdio};

use crate::{Error, Result};

/// A command to run along with how to report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Command line, interpreted by the host shell
    pub command: String,
    /// Logged when the command exits with status zero
    pub success: String,
    /// Logged when the command fails
    pub error: String,
    /// Abort the whole process if the command fails
    pub fatal: bool,
    /// Echo the command and its output
    pub verbose: bool,
}

/// What happened when a command was run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Exited with status zero
    Succeeded,
    /// Ran but exited non-zero (`None` if killed by a signal)
    Failed { code: Option<i32> },
    /// The shell itself could not be started
    SpawnFailed(String),
}

impl ExecOutcome {
    /// Whether the command succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Runs shell commands on behalf of the submodule lifecycle
pub trait CommandExecutor {
    /// Run a command, report it, and return the outcome
    ///
    /// Implementations decide what `fatal` means; [`ShellExecutor`] exits
    /// the process.
    fn execute(&self, request: &ExecRequest) -> ExecOutcome;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn execute(&self, request: &ExecRequest) -> ExecOutcome {
        (**self).execute(request)
    }
}

/// Checks whether a program can be invoked on this host
pub trait CommandAvailability {
    /// Whether `program` is invocable from `PATH` (or as given)
    fn is_available(&self, program: &str) -> bool;
}

impl<T: CommandAvailability + ?Sized> CommandAvailability for &T {
    fn is_available(&self, program: &str) -> bool {
        (**self).is_available(program)
    }
}

/// Executor backed by the host shell (`sh -c`, or `cmd /C` on Windows)
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    /// Create a new shell executor
    pub fn new() -> Self {
        Self
    }

    /// Run a command line through the shell and capture its output
    pub fn run(command: &str) -> Result<Output> {
        shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::Command(format!("Failed to run '{}': {}", command, e)))
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, request: &ExecRequest) -> ExecOutcome {
        if request.verbose {
            tracing::info!(command = %request.command, "Running command");
        }

        let outcome = match Self::run(&request.command) {
            Ok(output) => {
                if request.verbose {
                    log_output(&output);
                }
                if output.status.success() {
                    ExecOutcome::Succeeded
                } else {
                    if !request.verbose {
                        let stderr = String::from_utf8_lossy(&output.stderr);
                        if !stderr.trim().is_empty() {
                            tracing::warn!("{}", stderr.trim_end());
                        }
                    }
                    ExecOutcome::Failed {
                        code: output.status.code(),
                    }
                }
            }
            Err(e) => ExecOutcome::SpawnFailed(e.to_string()),
        };

        if report(request, &outcome) {
            std::process::exit(1);
        }

        outcome
    }
}

/// Log the outcome using the request's labels
///
/// Returns `true` when the failure is fatal and the process must exit.
fn report(request: &ExecRequest, outcome: &ExecOutcome) -> bool {
    match outcome {
        ExecOutcome::Succeeded => {
            tracing::info!("{}", request.success);
            false
        }
        ExecOutcome::Failed { code } if request.fatal => {
            tracing::error!(code = ?code, "{}", request.error);
            true
        }
        ExecOutcome::SpawnFailed(reason) if request.fatal => {
            tracing::error!(reason = %reason, "{}", request.error);
            true
        }
        ExecOutcome::Failed { code } => {
            tracing::warn!(code = ?code, "{}", request.error);
            false
        }
        ExecOutcome::SpawnFailed(reason) => {
            tracing::warn!(reason = %reason, "{}", request.error);
            false
        }
    }
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

fn log_output(output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    for line in stdout.lines() {
        tracing::info!("{}", line);
    }
    for line in stderr.lines() {
        tracing::info!("{}", line);
    }
}

/// Availability check that tries to start `<program> --version`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeAvailability;

impl CommandAvailability for ProbeAvailability {
    fn is_available(&self, program: &str) -> bool {
        Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &str) -> ExecRequest {
        ExecRequest {
            command: command.to_string(),
            success: "ok".to_string(),
            error: "failed".to_string(),
            fatal: false,
            verbose: false,
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_success() {
        let outcome = ShellExecutor::new().execute(&request("true"));
        assert_eq!(outcome, ExecOutcome::Succeeded);
        assert!(outcome.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_non_fatal_failure_returns() {
        let outcome = ShellExecutor::new().execute(&request("exit 3"));
        assert_eq!(outcome, ExecOutcome::Failed { code: Some(3) });
        assert!(!outcome.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_verbose() {
        let mut req = request("echo hello");
        req.verbose = true;
        assert!(ShellExecutor::new().execute(&req).is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_output() {
        let output = ShellExecutor::run("echo captured").unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "captured");
    }

    #[test]
    fn test_report_aborts_only_on_fatal_failure() {
        let mut req = request("git pull");
        let failed = ExecOutcome::Failed { code: Some(1) };
        let spawn_failed = ExecOutcome::SpawnFailed("no shell".to_string());

        assert!(!report(&req, &ExecOutcome::Succeeded));
        assert!(!report(&req, &failed));
        assert!(!report(&req, &spawn_failed));

        req.fatal = true;
        assert!(!report(&req, &ExecOutcome::Succeeded));
        assert!(report(&req, &failed));
        assert!(report(&req, &spawn_failed));
    }

    const FATAL_CHILD_ENV: &str = "REPOSCOUT_FATAL_EXEC_CHILD";

    /// Runs in a child process; exits the test binary with status 1
    #[cfg(unix)]
    #[test]
    fn test_fatal_failure_child() {
        if std::env::var_os(FATAL_CHILD_ENV).is_none() {
            return;
        }

        let mut req = request("exit 3");
        req.fatal = true;
        ShellExecutor::new().execute(&req);
        // Only reached if the fatal failure did not exit
        std::process::exit(0);
    }

    #[cfg(unix)]
    #[test]
    fn test_fatal_failure_exits_process() {
        let exe = std::env::current_exe().unwrap();
        let status = std::process::Command::new(exe)
            .args(["--exact", "git::exec::tests::test_fatal_failure_child"])
            .env(FATAL_CHILD_ENV, "1")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(1));
    }

    #[test]
    fn test_probe_missing_program() {
        assert!(!ProbeAvailability.is_available("reposcout-definitely-not-a-program"));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_present_program() {
        assert!(ProbeAvailability.is_available("sh"));
    }
}
