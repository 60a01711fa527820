//! Agent configuration
//!
//! Loaded once from a YAML file and passed by value to the connector and
//! the runner at construction; nothing reads configuration globally.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub ssh: SshConfig,

    /// Manifest file with the ordered task list.
    pub manifest: PathBuf,

    /// Hosts file, one target hostname per line.
    pub hosts: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// Remote user for all hosts. Defaults to the local user when unset.
    #[serde(default)]
    pub user: Option<String>,

    /// Private key to authenticate with; ambient keys/agent otherwise.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub strict_host_key_checking: bool,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: None,
            identity_file: None,
            connect_timeout_secs: default_connect_timeout(),
            strict_host_key_checking: false,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("invalid config file {path}: {error}")]
    Parse { path: String, error: String },
}
