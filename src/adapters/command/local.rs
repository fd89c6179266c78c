//! Local process execution

use super::display_command;
use crate::adapters::traits::{CommandOutput, CommandRunner, RunOptions};
use crate::domain::{ExportError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs commands as child processes of this host
///
/// Privileged invocations are prefixed with the root helper (for example
/// `["sudo", "-n"]`). With an empty helper they run with the current
/// credentials.
#[derive(Debug, Clone, Default)]
pub struct LocalCommandRunner {
    root_helper: Vec<String>,
}

impl LocalCommandRunner {
    /// Runner without a root helper
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that prefixes privileged commands with `root_helper`
    pub fn with_root_helper(root_helper: Vec<String>) -> Self {
        Self { root_helper }
    }

    fn command_line(&self, argv: &[&str], run_as_root: bool) -> Vec<String> {
        let helper = if run_as_root {
            self.root_helper.as_slice()
        } else {
            &[]
        };
        helper
            .iter()
            .cloned()
            .chain(argv.iter().map(|s| s.to_string()))
            .collect()
    }
}

fn failure(command: &str, exit_code: Option<i32>, stdout: String, stderr: String) -> ExportError {
    ExportError::Command {
        command: command.to_string(),
        exit_code,
        stdout,
        stderr,
    }
}

#[async_trait]
impl CommandRunner for LocalCommandRunner {
    async fn run(&self, argv: &[&str], options: RunOptions) -> Result<CommandOutput> {
        let line = self.command_line(argv, options.run_as_root);
        let rendered = display_command(&line);
        let (program, args) = line
            .split_first()
            .ok_or_else(|| failure("", None, String::new(), "empty command line".to_string()))?;

        tracing::debug!(command = %rendered, "Running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if options.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| failure(&rendered, None, String::new(), e.to_string()))?;

        // Feed stdin concurrently so a chatty child cannot block on a full pipe
        let feeder = match (options.stdin, child.stdin.take()) {
            (Some(payload), Some(mut stdin)) => Some(tokio::spawn(async move {
                let result = stdin.write_all(&payload).await;
                drop(stdin);
                result
            })),
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failure(&rendered, None, String::new(), e.to_string()))?;

        if let Some(feeder) = feeder {
            match feeder.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(command = %rendered, error = %e, "Failed to write command stdin")
                }
                Err(e) => {
                    tracing::warn!(command = %rendered, error = %e, "Stdin writer task failed")
                }
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::debug!(
                command = %rendered,
                exit_code = ?output.status.code(),
                stderr = %stderr.trim(),
                "Command failed"
            );
            return Err(failure(&rendered, output.status.code(), stdout, stderr));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_with_root_helper() {
        let runner = LocalCommandRunner::with_root_helper(vec!["sudo".into(), "-n".into()]);
        assert_eq!(
            runner.command_line(&["mv", "a", "b"], true),
            vec!["sudo", "-n", "mv", "a", "b"]
        );
        assert_eq!(runner.command_line(&["ls", "/"], false), vec!["ls", "/"]);
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = LocalCommandRunner::new();
        let output = runner
            .run(&["echo", "hello"], RunOptions::unprivileged())
            .await
            .unwrap();
        assert_eq!(output.stdout, "hello\n");
    }

    #[tokio::test]
    async fn test_run_feeds_stdin() {
        let runner = LocalCommandRunner::new();
        let output = runner
            .run(&["cat"], RunOptions::unprivileged().with_stdin("EXPORT {}\n"))
            .await
            .unwrap();
        assert_eq!(output.stdout, "EXPORT {}\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_error() {
        let runner = LocalCommandRunner::new();
        let err = runner
            .run(&["sh", "-c", "echo oops >&2; exit 3"], RunOptions::as_root())
            .await
            .unwrap_err();
        match err {
            ExportError::Command {
                command,
                exit_code,
                stderr,
                ..
            } => {
                assert_eq!(command, "sh -c 'echo oops >&2; exit 3'");
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "oops\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_command_error() {
        let runner = LocalCommandRunner::new();
        let err = runner
            .run(&["definitely-not-a-real-binary-xyz"], RunOptions::unprivileged())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Command { exit_code: None, .. }));
    }
}
