//! Manifest and host list loading
//!
//! A manifest is an ordered YAML sequence of tasks; each task names exactly
//! one module kind. Order is execution order: no reordering, no dependency
//! graph. Module kinds are a closed set, so an unrecognized kind fails at
//! load time, before any remote session is opened.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One entry of the manifest. Immutable once loaded; read-only to modules.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(flatten)]
    pub module: ModuleSpec,
}

/// Closed dispatch over the fixed module set.
///
/// Parameters stay loosely typed here; each module validates its own
/// parameters at construction so a malformed action fails only that task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSpec {
    Package(PackageSpec),
    File(FileSpec),
    Service(ServiceSpec),
}

impl ModuleSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleSpec::Package(_) => "package",
            ModuleSpec::File(_) => "file",
            ModuleSpec::Service(_) => "service",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageSpec {
    pub action: String,
    pub package: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub action: String,
    #[serde(default)]
    pub src: Option<PathBuf>,
    pub dest: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    pub action: String,
    pub service: String,
}

/// Ordered task list.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub tasks: Vec<Task>,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let tasks = serde_yaml::from_str(&content).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        Ok(Self { tasks })
    }
}

/// Ordered target hosts. Duplicates are permitted and re-run the manifest
/// against the same host.
#[derive(Debug, Clone)]
pub struct HostList {
    pub hosts: Vec<String>,
}

impl HostList {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let hosts = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();

        Self { hosts }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("invalid manifest {path}: {error}")]
    Parse { path: String, error: String },
}
