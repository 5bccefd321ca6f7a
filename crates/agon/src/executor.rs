//! Timed execution of one binary against one benchmark directory

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::config::{BinaryConfig, ExecutionConfig};
use crate::constants::STDERR_EXCERPT_CHARS;
use crate::time::format_limit;

/// How long to keep draining stderr after the child has exited
const STDERR_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Result of running a binary once
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// Exited with status zero
    Completed { elapsed: Duration },
    /// Non-zero exit, or killed by a signal (`-signal`)
    Failed {
        exit_code: i32,
        stderr_excerpt: Option<String>,
    },
    /// Still running when the limit expired; killed and reaped
    TimedOut { limit: Duration },
    /// Could not be started or waited on
    LaunchFailed { message: String },
}

impl InvocationOutcome {
    /// Elapsed seconds, only for a completed run
    pub fn elapsed_secs(&self) -> Option<f64> {
        match self {
            InvocationOutcome::Completed { elapsed } => Some(elapsed.as_secs_f64()),
            _ => None,
        }
    }

    /// Console lines describing this outcome for the binary `label`
    pub fn report_lines(&self, label: &str) -> Vec<String> {
        match self {
            InvocationOutcome::Completed { elapsed } => {
                vec![format!("    {} completed in {:.3}s", label, elapsed.as_secs_f64())]
            }
            InvocationOutcome::Failed {
                exit_code,
                stderr_excerpt,
            } => {
                let mut lines = vec![format!("    {} failed with exit code {}", label, exit_code)];
                if let Some(excerpt) = stderr_excerpt {
                    lines.push(format!("    Error: {}...", excerpt));
                }
                lines
            }
            InvocationOutcome::TimedOut { limit } => {
                vec![format!("    {} timed out (>{})", label, format_limit(*limit))]
            }
            InvocationOutcome::LaunchFailed { message } => {
                vec![format!("    {} error: {}", label, message)]
            }
        }
    }
}

/// Runs the compared binaries, one invocation at a time
pub struct Executor {
    program_file: PathBuf,
    execution: ExecutionConfig,
}

impl Executor {
    /// Create a new executor
    pub fn new(program_file: PathBuf, execution: ExecutionConfig) -> Self {
        Self {
            program_file,
            execution,
        }
    }

    /// Build the command line: `<binary> <program> <flag> <benchmark_dir>`
    fn command(&self, binary: &Path, benchmark_dir: &Path) -> Command {
        let mut cmd = Command::new(binary);
        cmd.arg(&self.program_file)
            .arg(&self.execution.input_flag)
            .arg(benchmark_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(if self.execution.capture_stderr {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        cmd
    }

    /// Run `binary` against `benchmark_dir` and time it.
    ///
    /// The clock starts just before spawning and stops once the child has
    /// exited. Errors never escape: every failure mode is an outcome.
    pub async fn run(&self, binary: &BinaryConfig, benchmark_dir: &Path) -> InvocationOutcome {
        tracing::debug!(
            "Spawning {}: {:?} {:?} {} {:?}",
            binary.label,
            binary.path,
            self.program_file,
            self.execution.input_flag,
            benchmark_dir
        );

        let start = Instant::now();

        let mut child = match self.command(&binary.path, benchmark_dir).spawn() {
            Ok(child) => child,
            Err(e) => {
                return InvocationOutcome::LaunchFailed {
                    message: e.to_string(),
                };
            }
        };

        let stderr_reader = child.stderr.take().map(spawn_stderr_reader);

        match timeout(self.execution.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let elapsed = start.elapsed();

                if status.success() {
                    if let Some(reader) = stderr_reader {
                        reader.abort();
                    }
                    return InvocationOutcome::Completed { elapsed };
                }

                let stderr_excerpt = match stderr_reader {
                    Some(reader) => collect_excerpt(reader).await,
                    None => None,
                };

                InvocationOutcome::Failed {
                    exit_code: exit_code_of(&status),
                    stderr_excerpt,
                }
            }
            Ok(Err(e)) => {
                if let Some(reader) = stderr_reader {
                    reader.abort();
                }
                InvocationOutcome::LaunchFailed {
                    message: format!("Failed to wait for process: {}", e),
                }
            }
            Err(_) => {
                // Child::kill sends SIGKILL and waits, so nothing is left unreaped
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill timed out {}: {}", binary.label, e);
                }
                if let Some(reader) = stderr_reader {
                    reader.abort();
                }
                InvocationOutcome::TimedOut {
                    limit: self.execution.timeout,
                }
            }
        }
    }
}

fn spawn_stderr_reader(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            tracing::debug!("Stopped reading child stderr: {}", e);
        }
        buf
    })
}

async fn collect_excerpt(reader: JoinHandle<Vec<u8>>) -> Option<String> {
    let bytes = match timeout(STDERR_DRAIN_GRACE, reader).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::debug!("Stderr reader failed: {}", e);
            return None;
        }
        Err(_) => {
            tracing::debug!("Stderr still open after child exit, giving up");
            return None;
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let excerpt: String = text.chars().take(STDERR_EXCERPT_CHARS).collect();
    let excerpt = excerpt.trim_end();

    if excerpt.is_empty() {
        None
    } else {
        Some(excerpt.to_string())
    }
}

fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    /// Write an executable shell script standing in for a benchmarked binary
    pub(crate) fn fake_binary(dir: &Path, name: &str, body: &str) -> BinaryConfig {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "{}", body).unwrap();
        file.sync_all().unwrap();
        drop(file);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        BinaryConfig {
            label: name.to_string(),
            path,
        }
    }

    pub(crate) fn execution(timeout: Duration, capture_stderr: bool) -> ExecutionConfig {
        ExecutionConfig {
            input_flag: "-F".to_string(),
            timeout,
            capture_stderr,
        }
    }

    #[tokio::test]
    async fn test_success_is_timed() {
        let dir = TempDir::new().unwrap();
        let binary = fake_binary(dir.path(), "ok", "exit 0");
        let executor = Executor::new(dir.path().join("p.egg"), execution(Duration::from_secs(10), false));

        let outcome = executor.run(&binary, dir.path()).await;
        assert!(matches!(outcome, InvocationOutcome::Completed { .. }));
        assert!(outcome.elapsed_secs().unwrap() >= 0.0);
        assert!(outcome.report_lines("ok")[0].starts_with("    ok completed in "));
    }

    #[tokio::test]
    async fn test_arguments_passed_in_order() {
        let dir = TempDir::new().unwrap();
        let bench_dir = dir.path().join("bench-1");
        fs::create_dir(&bench_dir).unwrap();
        let binary = fake_binary(
            dir.path(),
            "argcheck",
            r#"[ "$1" = "prog.egg" ] && [ "$2" = "-F" ] && [ -d "$3" ] || exit 9"#,
        );
        let executor = Executor::new(PathBuf::from("prog.egg"), execution(Duration::from_secs(10), false));

        let outcome = executor.run(&binary, &bench_dir).await;
        assert!(matches!(outcome, InvocationOutcome::Completed { .. }), "{outcome:?}");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let dir = TempDir::new().unwrap();
        let binary = fake_binary(dir.path(), "bad", "echo boom >&2; exit 3");
        let executor = Executor::new(dir.path().join("p.egg"), execution(Duration::from_secs(10), false));

        let outcome = executor.run(&binary, dir.path()).await;
        assert_eq!(
            outcome,
            InvocationOutcome::Failed {
                exit_code: 3,
                stderr_excerpt: None,
            }
        );
        assert_eq!(outcome.elapsed_secs(), None);
        assert_eq!(outcome.report_lines("bad"), vec!["    bad failed with exit code 3"]);
    }

    #[tokio::test]
    async fn test_captured_stderr_is_truncated() {
        let dir = TempDir::new().unwrap();
        let binary = fake_binary(
            dir.path(),
            "noisy",
            "i=0; while [ $i -lt 300 ]; do printf x >&2; i=$((i+1)); done; exit 2",
        );
        let executor = Executor::new(dir.path().join("p.egg"), execution(Duration::from_secs(10), true));

        let outcome = executor.run(&binary, dir.path()).await;
        match &outcome {
            InvocationOutcome::Failed {
                exit_code,
                stderr_excerpt: Some(excerpt),
            } => {
                assert_eq!(*exit_code, 2);
                assert_eq!(excerpt.chars().count(), STDERR_EXCERPT_CHARS);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(outcome.report_lines("noisy")[1].starts_with("    Error: xxx"));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let dir = TempDir::new().unwrap();
        let binary = fake_binary(dir.path(), "slow", "exec sleep 30");
        let limit = Duration::from_millis(200);
        let executor = Executor::new(dir.path().join("p.egg"), execution(limit, true));

        let start = Instant::now();
        let outcome = executor.run(&binary, dir.path()).await;
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(outcome, InvocationOutcome::TimedOut { limit });
        assert_eq!(outcome.report_lines("slow"), vec!["    slow timed out (>200ms)"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_failure() {
        let dir = TempDir::new().unwrap();
        let binary = BinaryConfig {
            label: "ghost".to_string(),
            path: dir.path().join("does-not-exist"),
        };
        let executor = Executor::new(dir.path().join("p.egg"), execution(Duration::from_secs(10), false));

        let outcome = executor.run(&binary, dir.path()).await;
        assert!(matches!(outcome, InvocationOutcome::LaunchFailed { .. }));
        assert!(outcome.report_lines("ghost")[0].starts_with("    ghost error: "));
    }

    #[test]
    fn test_timeout_message_for_default_limit() {
        let outcome = InvocationOutcome::TimedOut {
            limit: Duration::from_secs(3600),
        };
        assert_eq!(outcome.report_lines("egglog"), vec!["    egglog timed out (>1 hour)"]);
    }
}
