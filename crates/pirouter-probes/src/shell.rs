//! Bounded external command execution.
//!
//! Every probe that shells out goes through [`run`], which enforces a hard
//! timeout and maps the failure modes onto the `ProbeError` taxonomy:
//! exceeding the bound is `Timeout`, a missing binary is `Unavailable`.
//! A command that runs but exits non-zero is not an error here; probes
//! decide what a failing exit status means for their value.

use std::time::Duration;

use pirouter_core::{ProbeError, Result};
use tokio::process::Command;

/// Captured output of a bounded command.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Trimmed stdout.
    pub stdout: String,
}

/// Run `program` with `args`, waiting at most `timeout_secs`.
pub async fn run(program: &str, args: &[&str], timeout_secs: u64) -> Result<ShellOutput> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), output).await {
        Err(_) => Err(ProbeError::timeout(program, timeout_secs)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ProbeError::Unavailable(program.to_string()))
        }
        Ok(Err(e)) => Err(ProbeError::Io(e)),
        Ok(Ok(out)) => Ok(ShellOutput {
            success: out.status.success(),
            stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let err = run("pirouter-no-such-tool", &[], 5).await.unwrap_err();
        assert!(matches!(err, ProbeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run("echo", &["hello"], 5).await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let out = run("false", &[], 5).await.unwrap();
        assert!(!out.success);
    }
}
