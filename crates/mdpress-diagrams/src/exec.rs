//! Deadline-bounded external process execution.
//!
//! Used by the mermaid renderer and by the format converters. Output streams
//! are drained on background threads while the parent polls for exit, so a
//! chatty child never deadlocks on a full pipe. On deadline the child is
//! killed and reaped.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ExecOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    /// Stderr as lossy UTF-8, trimmed, for error messages.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }
}

/// Error from [`run_with_timeout`].
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("process exceeded {0:?}")]
    Timeout(Duration),
    #[error("I/O error while waiting for process: {0}")]
    Io(#[from] std::io::Error),
}

fn drain(stream: Option<impl Read + Send + 'static>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

/// Run a command to completion or kill it at the deadline.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<ExecOutput, ExecError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        command: command.get_program().to_string_lossy().into_owned(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExecError::Timeout(timeout));
        }
        std::thread::sleep(Duration::from_millis(25));
    };

    Ok(ExecOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_status() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo out; echo err >&2; exit 3");

        let result = run_with_timeout(&mut cmd, Duration::from_secs(5)).unwrap();
        assert_eq!(result.status.code(), Some(3));
        assert_eq!(result.stdout, b"out\n");
        assert_eq!(result.stderr_text(), "err");
    }

    #[test]
    fn test_deadline_kills_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");

        let started = Instant::now();
        let result = run_with_timeout(&mut cmd, Duration::from_millis(200));
        assert!(matches!(result, Err(ExecError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let mut cmd = Command::new("mdpress-no-such-binary");
        let result = run_with_timeout(&mut cmd, Duration::from_secs(1));
        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }
}
