use thiserror::Error;

use crate::transport::{CopyError, ExecError};

/// Errors that can occur during module construction and execution
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid {module} module config: {reason}")]
    InvalidConfig {
        module: &'static str,
        reason: String,
    },

    #[error("service {service} does not correspond to an installed package")]
    ServiceNotFound { service: String },

    #[error("service {service} did not come back up after restart: {reason}")]
    ServiceRestartFailed { service: String, reason: String },

    #[error("unexpected output from {probe} probe: {output}")]
    Probe {
        probe: &'static str,
        output: String,
    },

    #[error("failed to read local file {path}: {error}")]
    LocalIo { path: String, error: String },

    #[error("remote execution failed: {0}")]
    Exec(#[from] ExecError),

    #[error("file transfer failed: {0}")]
    Copy(#[from] CopyError),
}

impl ModuleError {
    /// A restart that leaves a service down is unsafe to proceed past: it
    /// halts the entire run instead of failing a single task.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModuleError::ServiceRestartFailed { .. })
    }
}
