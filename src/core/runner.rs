//! External command execution with a timeout bound.
//!
//! [`execute`] blocks the calling thread until the child exits or the timeout
//! elapses, so it must only be called from worker threads, never from the
//! TUI thread. Every outcome, including failure to launch, is folded into a
//! [`CommandResult`]; nothing escapes as an error or a panic.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants;

/// Minimum time granted to the pipe readers after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Program plus arguments, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Builds a spec from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![program.into()];
        argv.extend(args.into_iter().map(Into::into));
        Self { argv }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    #[cfg(test)]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// Why a command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    /// The command ran longer than allowed and was killed.
    Timeout { after: Duration },
    /// The command ran and reported failure. `code` is `None` when it was
    /// terminated by a signal.
    NonZeroExit { code: Option<i32>, stderr: String },
    /// The command could not be started.
    Launch { program: String, reason: String },
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { after } => write!(f, "timed out after {}s", after.as_secs_f32()),
            Self::NonZeroExit { code: Some(code), stderr } => {
                write!(f, "exit status {code}: {}", stderr.trim_end())
            }
            Self::NonZeroExit { code: None, stderr } => {
                write!(f, "terminated by signal: {}", stderr.trim_end())
            }
            Self::Launch { program, reason } => write!(f, "failed to launch {program}: {reason}"),
        }
    }
}

/// Outcome of a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Exit status 0, with stdout captured verbatim.
    Success(String),
    Failure(CommandFailure),
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Runs `spec`, waiting at most `timeout` for it to exit.
///
/// Logs the command line before running it and logs every failure.
pub fn execute(spec: &CommandSpec, timeout: Duration) -> CommandResult {
    crate::log_info!("EXEC", "Running: {spec}");

    let result = run(spec, timeout);

    if let CommandResult::Failure(failure) = &result {
        crate::log_error!("EXEC", "'{spec}' {failure}");
    }
    result
}

fn run(spec: &CommandSpec, timeout: Duration) -> CommandResult {
    if timeout.is_zero() {
        return CommandResult::Failure(CommandFailure::Launch {
            program: spec.program().to_string(),
            reason: "timeout must be positive".to_string(),
        });
    }

    let spawned = Command::new(spec.program())
        .args(spec.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return CommandResult::Failure(CommandFailure::Launch {
                program: spec.program().to_string(),
                reason: e.to_string(),
            });
        }
    };

    // Drain both pipes while waiting, so a chatty child cannot block on a full pipe.
    let stdout = PipeDrain::spawn(child.stdout.take());
    let stderr = PipeDrain::spawn(child.stderr.take());

    // `None` when the timeout is too large to represent; the child is then awaited indefinitely.
    let deadline = Instant::now().checked_add(timeout);
    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_and_reap(&mut child);
            return CommandResult::Failure(CommandFailure::Timeout { after: timeout });
        }
        Err(e) => {
            kill_and_reap(&mut child);
            return CommandResult::Failure(CommandFailure::Launch {
                program: spec.program().to_string(),
                reason: format!("lost track of process: {e}"),
            });
        }
    };

    // A daemon forked by the child may keep the pipes open; never wait on it forever.
    let grace = deadline
        .map_or(DRAIN_GRACE, |d| d.saturating_duration_since(Instant::now()))
        .max(DRAIN_GRACE);
    let stdout = stdout.collect(grace);

    if status.success() {
        CommandResult::Success(stdout)
    } else {
        CommandResult::Failure(CommandFailure::NonZeroExit {
            code: status.code(),
            stderr: stderr.collect(DRAIN_GRACE),
        })
    }
}

/// Polls the child until it exits or `deadline` passes (`Ok(None)`).
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(constants::CHILD_POLL_MS));
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Reads one child pipe on a helper thread into a shared buffer.
///
/// Bytes are visible as soon as they are read, so output printed before a
/// grandchild inherited the pipe is never lost to a missing EOF.
struct PipeDrain {
    buf: Arc<Mutex<Vec<u8>>>,
    eof: mpsc::Receiver<()>,
}

impl PipeDrain {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, eof) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let shared = Arc::clone(&buf);
            thread::spawn(move || {
                let mut chunk = [0_u8; 4096];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => shared
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == ErrorKind::Interrupted => {}
                        Err(_) => break,
                    }
                }
                let _ = tx.send(());
            });
        }
        Self { buf, eof }
    }

    /// Waits up to `wait` for end of file, then returns everything read so far.
    fn collect(&self, wait: Duration) -> String {
        let _ = self.eof.recv_timeout(wait);
        let bytes = std::mem::take(&mut *self.buf.lock().unwrap_or_else(PoisonError::into_inner));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spec(argv: &[&str]) -> CommandSpec {
        CommandSpec::new(argv[0], argv[1..].iter().copied())
    }

    #[test]
    fn test_blank_program_is_launch_error() {
        let result = execute(&CommandSpec::new("", Vec::<String>::new()), Duration::from_secs(5));
        assert!(matches!(
            result,
            CommandResult::Failure(CommandFailure::Launch { .. })
        ));
    }

    #[test]
    fn test_spec_accessors_and_display() {
        let s = spec(&["wg", "show", "wg0"]);
        assert_eq!(s.program(), "wg");
        assert_eq!(s.args(), ["show", "wg0"]);
        assert_eq!(s.to_string(), "wg show wg0");
    }

    #[test]
    fn test_echo_success_verbatim() {
        let result = execute(&spec(&["echo", "hello"]), Duration::from_secs(5));
        assert_eq!(result, CommandResult::Success("hello\n".to_string()));
    }

    #[test]
    fn test_false_is_nonzero_exit() {
        let result = execute(&spec(&["false"]), Duration::from_secs(5));
        assert_eq!(
            result,
            CommandResult::Failure(CommandFailure::NonZeroExit {
                code: Some(1),
                stderr: String::new(),
            })
        );
    }

    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let result = execute(
            &spec(&["sh", "-c", "echo partial; echo oops >&2; exit 3"]),
            Duration::from_secs(5),
        );
        assert_eq!(
            result,
            CommandResult::Failure(CommandFailure::NonZeroExit {
                code: Some(3),
                stderr: "oops\n".to_string(),
            })
        );
    }

    #[test]
    fn test_sleep_times_out() {
        let started = Instant::now();
        let result = execute(&spec(&["sleep", "10"]), Duration::from_secs(1));
        assert_eq!(
            result,
            CommandResult::Failure(CommandFailure::Timeout {
                after: Duration::from_secs(1),
            })
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timed_out_child_is_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = format!("echo $$ > {}; exec sleep 10", pid_file.display());

        let result = execute(&spec(&["sh", "-c", &script]), Duration::from_millis(500));
        assert!(matches!(
            result,
            CommandResult::Failure(CommandFailure::Timeout { .. })
        ));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let proc_entry = std::path::Path::new("/proc").join(pid.trim());
        assert!(!proc_entry.exists(), "child {} still present", pid.trim());
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let result = execute(
            &spec(&["/nonexistent/wgmon-test-binary"]),
            Duration::from_secs(5),
        );
        match result {
            CommandResult::Failure(CommandFailure::Launch { program, reason }) => {
                assert_eq!(program, "/nonexistent/wgmon-test-binary");
                assert!(!reason.is_empty());
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[test]
    fn test_non_executable_is_launch_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-executable");
        std::fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let result = execute(
            &CommandSpec::new(path.to_string_lossy(), Vec::<String>::new()),
            Duration::from_secs(5),
        );
        assert!(matches!(
            result,
            CommandResult::Failure(CommandFailure::Launch { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected_without_spawning() {
        let result = execute(&spec(&["echo", "never"]), Duration::ZERO);
        match result {
            CommandResult::Failure(CommandFailure::Launch { reason, .. }) => {
                assert!(reason.contains("timeout"));
            }
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[test]
    fn test_output_kept_when_background_child_holds_pipe() {
        let started = Instant::now();
        let result = execute(
            &spec(&["sh", "-c", "echo hello; sleep 3 &"]),
            Duration::from_secs(1),
        );
        assert_eq!(result, CommandResult::Success("hello\n".to_string()));
        assert!(started.elapsed() < Duration::from_millis(2500));
    }

    #[test]
    fn test_huge_timeout_does_not_panic() {
        let result = execute(&spec(&["echo", "hello"]), Duration::MAX);
        assert_eq!(result, CommandResult::Success("hello\n".to_string()));
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let result = execute(
            &spec(&["sh", "-c", "i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done"]),
            Duration::from_secs(20),
        );
        match result {
            CommandResult::Success(out) => assert_eq!(out.len(), 20000 * 11),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_display() {
        let timeout = CommandFailure::Timeout {
            after: Duration::from_secs(10),
        };
        assert_eq!(timeout.to_string(), "timed out after 10s");

        let exit = CommandFailure::NonZeroExit {
            code: Some(1),
            stderr: "Unable to access interface: No such device\n".to_string(),
        };
        assert_eq!(
            exit.to_string(),
            "exit status 1: Unable to access interface: No such device"
        );
    }
}
