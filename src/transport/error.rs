use thiserror::Error;

/// Errors that can occur while opening a session to a host
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("host {host} unreachable: {reason}")]
    Unreachable { host: String, reason: String },
}

/// Errors that can occur while executing a remote command
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn ssh for {host}: {error}")]
    Spawn { host: String, error: String },

    #[error("ssh transport failure on {host}: {reason}")]
    Transport { host: String, reason: String },
}

/// Errors that can occur while transferring a file to a host
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("failed to spawn scp for {host}: {error}")]
    Spawn { host: String, error: String },

    #[error("copy to {host}:{remote_path} failed: {reason}")]
    Failed {
        host: String,
        remote_path: String,
        reason: String,
    },
}
