//! Remote execution transport
//!
//! The runner and the modules only ever talk to a host through the
//! [`Connector`] and [`Session`] traits, so the SSH implementation can be
//! swapped for a scripted one in tests.

mod error;
mod ssh;

pub use error::{ConnectError, CopyError, ExecError};
pub use ssh::{SshConnector, SshSession};

use async_trait::async_trait;
use std::path::Path;

/// Captured output of one remote command.
///
/// A non-zero exit status is data, not an error: probe commands encode their
/// answer in stdout and mutating commands are classified by re-checking
/// state. [`ExecError`] is reserved for transport-level failures.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First stdout line, trimmed. Probe parsers mostly want exactly this.
    pub fn first_line(&self) -> &str {
        self.stdout.first().map(|l| l.trim()).unwrap_or("")
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.join("\n").trim().to_string()
    }
}

/// A live remote-shell connection bound to exactly one host.
///
/// Sessions are never shared across hosts and must be closed exactly once,
/// which the runner guarantees on every exit path.
#[async_trait]
pub trait Session: Send {
    fn host(&self) -> &str;

    /// Run a command on the remote host and capture its output streams.
    async fn execute(&mut self, command: &str) -> Result<CommandOutput, ExecError>;

    /// Transfer a local file to a path on the remote host.
    async fn copy_file(&mut self, local: &Path, remote: &str) -> Result<(), CopyError>;

    /// Release the session's transport resources.
    async fn close(&mut self);
}

/// Opens sessions to hosts.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str) -> Result<Box<dyn Session>, ConnectError>;
}
