//! Shared helper for running external executables

use crate::error::{CollaboratorError, Result};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

/// Run `program` with `args`, returning stdout on success
///
/// Non-zero exit statuses fail with the captured stderr; a program that
/// cannot be spawned because it does not exist fails with
/// [`CollaboratorError::MissingExecutable`].
pub(crate) async fn run<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    tracing::debug!(program, "Running external command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => CollaboratorError::MissingExecutable(program.to_string()),
            _ => CollaboratorError::Io(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!(program, status = %output.status, "External command failed: {}", stderr.trim());
        return Err(CollaboratorError::process(
            program,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let out = run("sh", ["-c", "printf hello"]).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_run_reports_stderr_on_failure() {
        let err = run("sh", ["-c", "echo boom >&2; exit 3"]).await.unwrap_err();
        match err {
            CollaboratorError::Process { program, message } => {
                assert_eq!(program, "sh");
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let err = run("definitely-not-a-real-binary-stepflow", ["--version"])
            .await
            .unwrap_err();
        assert!(err.is_missing_executable());
    }
}
