// ABOUTME: Shell runner shared by the bash tool and command plugins.
// ABOUTME: Applies a static denylist, then runs the command with a hard timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::config::ShellConfig;
use crate::error::ToolError;

/// Substrings that block a command outright, matched case-insensitively.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "rm -rf /",
    "rm -rf /*",
    "rm -fr /",
    "mkfs",
    "dd if=",
    "of=/dev/sd",
    "> /dev/sd",
    ":(){ :|:& };:",
    ":(){:|:&};:",
    "shutdown",
    "reboot",
    "poweroff",
    "init 0",
    "init 6",
    "format c:",
    "chmod -r 777 /",
];

/// Static denylist check for shell commands.
#[derive(Debug, Clone)]
pub struct ShellGuard {
    patterns: Vec<String>,
}

impl Default for ShellGuard {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ShellGuard {
    /// The built-in denylist plus `extra`.
    pub fn new(extra: &[String]) -> Self {
        let patterns = DEFAULT_DENYLIST
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().map(|p| p.to_lowercase()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Fail with [`ToolError::Security`] if `command` contains a denied pattern.
    pub fn check(&self, command: &str) -> Result<(), ToolError> {
        let lowered = command.to_lowercase();
        match self.patterns.iter().find(|p| lowered.contains(p.as_str())) {
            Some(pattern) => {
                tracing::warn!(command, pattern = %pattern, "blocked shell command");
                Err(ToolError::Security(format!(
                    "command contains blocked pattern '{}'",
                    pattern
                )))
            }
            None => Ok(()),
        }
    }
}

/// Captured output of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs guarded shell commands in fresh subprocesses.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    guard: ShellGuard,
    default_timeout: Duration,
    max_timeout: Duration,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::from_config(&ShellConfig::default())
    }
}

impl ShellRunner {
    /// A `timeout_secs` of zero falls back to the built-in default.
    pub fn from_config(config: &ShellConfig) -> Self {
        let default_secs = match config.timeout_secs {
            0 => ShellConfig::default().timeout_secs,
            secs => secs,
        };
        Self {
            guard: ShellGuard::new(&config.denylist),
            default_timeout: Duration::from_secs(default_secs),
            max_timeout: Duration::from_secs(config.max_timeout_secs.max(1)),
        }
    }

    pub fn guard(&self) -> &ShellGuard {
        &self.guard
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// The effective timeout for a requested number of seconds. Missing or
    /// non-positive requests use the default; large ones are clamped.
    pub fn timeout_for(&self, requested_secs: Option<f64>) -> Duration {
        let wanted = match requested_secs {
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
            _ => self.default_timeout,
        };
        wanted.min(self.max_timeout)
    }

    /// Check `command` against the denylist, then run it.
    ///
    /// A non-zero exit is not an error here; callers decide how to report
    /// it. The timeout covers both the exit and reading the output. Once the
    /// shell exits, whatever it left running in its process group is killed.
    /// On timeout the whole group is killed and reaped.
    pub async fn run(
        &self,
        command: &str,
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput, ToolError> {
        self.guard.check(command)?;

        if let Some(dir) = cwd {
            if !dir.is_dir() {
                return Err(ToolError::Execution(format!(
                    "working directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = tokio::process::Command::new("cmd.exe");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = tokio::process::Command::new("bash");
            c.arg("-c").arg(command);
            c
        };
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::Execution(format!("failed to spawn command: {}", e)))?;
        tracing::debug!(command, pid = ?child.id(), "spawned shell command");

        let pid = child.id();
        let mut stdout = collect(child.stdout.take());
        let mut stderr = collect(child.stderr.take());

        let finished = tokio::time::timeout(timeout, async {
            let status = child.wait().await;
            // background jobs would otherwise hold the pipes open
            kill_group(pid);
            let out = join_output(&mut stdout).await;
            let err = join_output(&mut stderr).await;
            status.map(|status| (status, out, err))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                let output = CommandOutput {
                    exit_code: status.code().unwrap_or(-1),
                    stdout,
                    stderr,
                };
                tracing::debug!(command, exit_code = output.exit_code, "shell command exited");
                Ok(output)
            }
            Ok(Err(e)) => {
                stdout.abort();
                stderr.abort();
                Err(ToolError::Execution(format!("failed to wait for command: {}", e)))
            }
            Err(_) => {
                kill_group(pid);
                // the shell may have exited already, leaving only the drain
                if matches!(child.try_wait(), Ok(None)) {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(command, error = %e, "failed to reap timed out command");
                    }
                }
                stdout.abort();
                stderr.abort();
                tracing::warn!(command, timeout = ?timeout, "shell command timed out");
                Err(ToolError::Timeout {
                    seconds: timeout.as_secs_f64(),
                })
            }
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // SAFETY: killpg only sends a signal. process_group(0) made the
        // group id equal to the child pid. ESRCH for an empty group is fine.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

fn collect<R>(stream: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_end(&mut buf).await {
                tracing::debug!(error = %e, "stopped reading command output");
            }
        }
        buf
    })
}

async fn join_output(handle: &mut JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.await.unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
