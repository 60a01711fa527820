//! SSH transport backed by the system `ssh` and `scp` binaries

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::config::SshConfig;
use crate::transport::{CommandOutput, ConnectError, Connector, CopyError, ExecError, Session};

/// ssh reserves this exit code for its own failures; anything else is the
/// remote command's status.
const SSH_TRANSPORT_FAILURE: i32 = 255;

pub struct SshConnector {
    config: SshConfig,
}

impl SshConnector {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, host: &str) -> Result<Box<dyn Session>, ConnectError> {
        let mut session = SshSession::new(host.to_string(), self.config.clone());

        debug!("opening ssh session to {}", host);

        // Probe reachability up front so an unreachable host fails before
        // any task runs against it.
        let probe = session.execute("true").await;
        match probe {
            Ok(output) if output.success() => Ok(Box::new(session)),
            Ok(output) => {
                session.close().await;
                Err(ConnectError::Unreachable {
                    host: host.to_string(),
                    reason: output.stderr_text(),
                })
            }
            Err(e) => {
                session.close().await;
                Err(ConnectError::Unreachable {
                    host: host.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

pub struct SshSession {
    host: String,
    config: SshConfig,
    closed: bool,
}

impl SshSession {
    fn new(host: String, config: SshConfig) -> Self {
        Self {
            host,
            config,
            closed: false,
        }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];

        if !self.config.strict_host_key_checking {
            args.push("-o".to_string());
            args.push("StrictHostKeyChecking=no".to_string());
        }

        args.push("-o".to_string());
        args.push(format!(
            "ConnectTimeout={}",
            self.config.connect_timeout_secs
        ));

        if let Some(identity) = &self.config.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        args
    }

    fn target(&self) -> String {
        match &self.config.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}

#[async_trait]
impl Session for SshSession {
    fn host(&self) -> &str {
        &self.host
    }

    async fn execute(&mut self, command: &str) -> Result<CommandOutput, ExecError> {
        debug!("executing on {}: {}", self.host, command);

        let output = Command::new("ssh")
            .args(self.common_args())
            .arg(self.target())
            .arg(command)
            .output()
            .await
            .map_err(|e| ExecError::Spawn {
                host: self.host.clone(),
                error: e.to_string(),
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code == SSH_TRANSPORT_FAILURE {
            return Err(ExecError::Transport {
                host: self.host.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            exit_code,
            stdout: capture_lines(&output.stdout),
            stderr: capture_lines(&output.stderr),
        })
    }

    async fn copy_file(&mut self, local: &Path, remote: &str) -> Result<(), CopyError> {
        debug!(
            "copying {} to {}:{}",
            local.display(),
            self.host,
            remote
        );

        let output = Command::new("scp")
            .args(self.common_args())
            .arg(local)
            .arg(format!("{}:{}", self.target(), remote))
            .output()
            .await
            .map_err(|e| CopyError::Spawn {
                host: self.host.clone(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CopyError::Failed {
                host: self.host.clone(),
                remote_path: remote.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            debug!("closing ssh session to {}", self.host);
            self.closed = true;
        }
    }
}

fn capture_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.to_string())
        .collect()
}
