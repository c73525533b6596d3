//! Subprocess execution with bounded timeouts and tool detection.
//!
//! External measurement tools are untrusted: they may be missing, hang, or
//! exit nonzero. `run_command` never returns an error for those states;
//! instead they are encoded in the [`ProcessOutcome`] so callers can branch
//! without error-handling control flow.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

/// Exit code reported when the executable does not exist.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when the command exceeded its timeout and was killed.
pub const EXIT_TIMEOUT: i32 = 124;

/// Interval between `try_wait` polls while a child is running.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of one subprocess invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessOutcome {
    /// Process exit code. 127 = executable not found, 124 = timed out,
    /// -1 = killed by signal or unobservable status.
    pub exit_code: i32,
    /// Trimmed standard output. Empty on not-found and timeout.
    pub stdout: String,
    /// Trimmed standard error. Carries a human-readable cause on
    /// not-found and timeout.
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Standard output and standard error joined with a newline.
    ///
    /// Some tools (notably `ping` under error conditions) split their
    /// summary across both streams.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Returns whether `name` resolves to an executable on the search path.
///
/// Pure query, no caching: it runs at most once per sample per tool.
pub fn tool_available(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Runs `cmd` with `args`, waiting at most `timeout` for it to finish.
///
/// A missing executable yields exit code [`EXIT_NOT_FOUND`]; a timeout kills
/// the child and yields [`EXIT_TIMEOUT`]. Both populate `stderr` with the
/// cause and leave `stdout` empty. All other spawn failures are reported the
/// same way with exit code -1 so callers never need to unwind.
pub fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> ProcessOutcome {
    debug!("running {} {:?} (timeout {}s)", cmd, args, timeout.as_secs());

    let mut child = match Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return ProcessOutcome {
                exit_code: EXIT_NOT_FOUND,
                stdout: String::new(),
                stderr: format!("command not found: {}", cmd),
            };
        }
        Err(e) => {
            return ProcessOutcome {
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("failed to spawn {}: {}", cmd, e),
            };
        }
    };

    // Drain both pipes on background threads; a chatty child would otherwise
    // block on a full pipe and never reach its exit status.
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let stderr = format!("failed to wait for {}: {}", cmd, e);
                join_reader(stdout_reader);
                join_reader(stderr_reader);
                return ProcessOutcome {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr,
                };
            }
        }
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);

    match status {
        Some(status) => ProcessOutcome {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        },
        None => ProcessOutcome {
            exit_code: EXIT_TIMEOUT,
            stdout: String::new(),
            stderr: format!("timeout after {}s: {}", timeout.as_secs(), cmd),
        },
    }
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> Option<JoinHandle<String>> {
    source.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = reader.read_to_string(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable() {
        let outcome = run_command(
            "netgauge-no-such-tool-1b2c3",
            &[],
            Duration::from_secs(5),
        );
        assert_eq!(outcome.exit_code, EXIT_NOT_FOUND);
        assert!(outcome.stdout.is_empty());
        assert!(!outcome.stderr.is_empty());
        assert!(!outcome.success());
    }

    #[test]
    fn test_timeout_kills_child() {
        let outcome = run_command("sleep", &["10"], Duration::from_secs(1));
        assert_eq!(outcome.exit_code, EXIT_TIMEOUT);
        assert!(outcome.stdout.is_empty());
        assert!(outcome.stderr.contains("timeout"));
    }

    #[test]
    fn test_captures_trimmed_stdout() {
        let outcome = run_command("echo", &["hello world"], Duration::from_secs(5));
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "hello world");
        assert!(outcome.stderr.is_empty());
    }

    #[test]
    fn test_nonzero_exit_code() {
        let outcome = run_command("sh", &["-c", "exit 3"], Duration::from_secs(5));
        assert_eq!(outcome.exit_code, 3);
        assert!(!outcome.success());
    }

    #[test]
    fn test_combined_joins_streams() {
        let outcome = run_command(
            "sh",
            &["-c", "echo out; echo err >&2"],
            Duration::from_secs(5),
        );
        let combined = outcome.combined();
        assert!(combined.contains("out"));
        assert!(combined.contains("err"));
    }

    #[test]
    fn test_tool_available() {
        assert!(tool_available("sh"));
        assert!(!tool_available("netgauge-no-such-tool-1b2c3"));
    }
}
