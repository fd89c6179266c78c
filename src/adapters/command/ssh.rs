//! Remote execution over SSH

use super::{display_command, LocalCommandRunner};
use crate::adapters::traits::{CommandOutput, CommandRunner, RunOptions};
use crate::domain::{ExportError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Runs commands on a remote gateway through the system `ssh` client
///
/// The argv is quoted into a single remote command line. Privileged
/// invocations are prefixed with the remote root helper; stdin is forwarded
/// over the connection.
#[derive(Debug, Clone)]
pub struct SshCommandRunner {
    destination: String,
    port: u16,
    private_key: Option<PathBuf>,
    root_helper: Vec<String>,
    local: LocalCommandRunner,
}

impl SshCommandRunner {
    /// Create a runner for `login@host:port`
    pub fn new(host: impl AsRef<str>, port: u16, login: impl AsRef<str>) -> Self {
        Self {
            destination: format!("{}@{}", login.as_ref(), host.as_ref()),
            port,
            private_key: None,
            root_helper: Vec::new(),
            local: LocalCommandRunner::new(),
        }
    }

    /// Authenticate with the given private key file
    pub fn with_private_key(mut self, key: impl Into<PathBuf>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Prefix privileged commands with `root_helper` on the remote side
    pub fn with_root_helper(mut self, root_helper: Vec<String>) -> Self {
        self.root_helper = root_helper;
        self
    }

    /// Remote command line for `argv`
    fn remote_command(&self, argv: &[&str], run_as_root: bool) -> String {
        let mut words: Vec<&str> = Vec::new();
        if run_as_root {
            words.extend(self.root_helper.iter().map(String::as_str));
        }
        words.extend_from_slice(argv);
        display_command(&words)
    }

    /// Local `ssh` argv running `remote`
    fn ssh_argv(&self, remote: String) -> Vec<String> {
        let mut argv = vec![
            "ssh".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        if let Some(key) = &self.private_key {
            argv.push("-i".to_string());
            argv.push(key.display().to_string());
        }
        argv.push(self.destination.clone());
        argv.push("--".to_string());
        argv.push(remote);
        argv
    }
}

#[async_trait]
impl CommandRunner for SshCommandRunner {
    async fn run(&self, argv: &[&str], options: RunOptions) -> Result<CommandOutput> {
        let remote = self.remote_command(argv, options.run_as_root);
        let ssh_argv = self.ssh_argv(remote.clone());
        let ssh_refs: Vec<&str> = ssh_argv.iter().map(String::as_str).collect();

        tracing::debug!(destination = %self.destination, command = %remote, "Running remote command");

        let local_options = RunOptions {
            run_as_root: false,
            stdin: options.stdin,
        };

        self.local
            .run(&ssh_refs, local_options)
            .await
            .map_err(|e| match e {
                ExportError::Command {
                    exit_code,
                    stdout,
                    stderr,
                    ..
                } => ExportError::Command {
                    command: format!("{remote} (on {})", self.destination),
                    exit_code,
                    stdout,
                    stderr,
                },
                other => other,
            })
    }
}
