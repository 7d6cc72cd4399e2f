//! Target executable execution and output capture.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Captured result of one target executable run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRun {
    /// Path of the executable that ran.
    pub target: PathBuf,

    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    /// Trimmed standard-output lines, in emission order.
    pub stdout_lines: Vec<String>,

    /// Captured standard error.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited with status zero.
    pub success: bool,
}

/// Execute a target with no arguments and no stdin, capturing both streams.
///
/// The target runs to completion before this returns. `timeout_secs == 0`
/// disables the timeout and a hanging target blocks indefinitely; a
/// configured timeout elapsing is an execution error, as is a spawn
/// failure.
pub async fn run_target(target: &Path, timeout_secs: u64) -> anyhow::Result<TargetRun> {
    let start = Instant::now();

    let child = Command::new(target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let output = if timeout_secs > 0 {
        tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "target {:?} timed out after {} seconds",
                target,
                timeout_secs
            )
        })??
    } else {
        child.wait_with_output().await?
    };

    let duration_ms = start.elapsed().as_millis() as u64;

    let stdout_lines = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.trim().to_string())
        .collect();

    Ok(TargetRun {
        target: target.to_path_buf(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout_lines,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms,
        success: output.status.success(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_trimmed_stdout_lines() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ok.sh", "printf '  one  \\ntwo\\n'");

        let run = run_target(&script, 0).await.expect("run failed");
        assert!(run.success);
        assert_eq!(run.exit_code, 0);
        assert_eq!(run.stdout_lines, vec!["one".to_string(), "two".to_string()]);
        assert!(run.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_failure_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fail.sh", "echo boom >&2\nexit 2");

        let run = run_target(&script, 0).await.expect("run failed");
        assert!(!run.success);
        assert_eq!(run.exit_code, 2);
        assert!(run.stderr.contains("boom"));
    }

    #[tokio::test]
    async fn test_run_spawn_error_on_missing_target() {
        let result = run_target(Path::new("/nonexistent-example-binary"), 0).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout_elapses() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "hang.sh", "sleep 5");

        let err = run_target(&script, 1).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
