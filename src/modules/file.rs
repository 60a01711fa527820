//! File module - converges a remote file to desired content and metadata

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::manifest::FileSpec;
use crate::modules::error::ModuleError;
use crate::modules::interface::ModuleResult;
use crate::modules::probes;
use crate::transport::Session;

#[derive(Debug)]
pub enum FileModule {
    Present {
        src: PathBuf,
        dest: String,
        owner: String,
        group: String,
        mode: String,
    },
    Absent {
        dest: String,
    },
}

impl FileModule {
    pub fn from_spec(spec: &FileSpec) -> Result<Self, ModuleError> {
        match spec.action.as_str() {
            "present" => {
                let src = require(spec.src.clone(), "src")?;
                let owner = require(spec.owner.clone(), "owner")?;
                let group = require(spec.group.clone(), "group")?;
                let mode = require(spec.mode.clone(), "mode")?;

                if mode_bits(&mode).is_none() {
                    return Err(ModuleError::InvalidConfig {
                        module: "file",
                        reason: format!("mode `{mode}` is not an octal permission value"),
                    });
                }

                Ok(FileModule::Present {
                    src,
                    dest: spec.dest.clone(),
                    owner,
                    group,
                    mode,
                })
            }
            "absent" => Ok(FileModule::Absent {
                dest: spec.dest.clone(),
            }),
            other => Err(ModuleError::InvalidConfig {
                module: "file",
                reason: format!(
                    "invalid action `{other}`, valid actions are `present` and `absent`"
                ),
            }),
        }
    }

    pub async fn apply(&self, session: &mut dyn Session) -> Result<ModuleResult, ModuleError> {
        match self {
            FileModule::Present {
                src,
                dest,
                owner,
                group,
                mode,
            } => apply_present(session, src, dest, owner, group, mode).await,
            FileModule::Absent { dest } => apply_absent(session, dest).await,
        }
    }
}

async fn apply_present(
    session: &mut dyn Session,
    src: &Path,
    dest: &str,
    owner: &str,
    group: &str,
    mode: &str,
) -> Result<ModuleResult, ModuleError> {
    let digest = local_sha256(src)?;
    let staging = staging_path(dest);

    debug!("staging {} to {}:{}", src.display(), session.host(), staging);
    session.copy_file(src, &staging).await?;

    let result = converge(session, &staging, dest, &digest, owner, group, mode).await;

    // The staged file is removed on every exit path, including failure.
    let cleanup = format!("rm -f {}", shell_words::quote(&staging));
    if let Err(e) = session.execute(&cleanup).await {
        warn!("failed to remove staged file {}: {}", staging, e);
    }

    result
}

async fn converge(
    session: &mut dyn Session,
    staging: &str,
    dest: &str,
    digest: &str,
    owner: &str,
    group: &str,
    mode: &str,
) -> Result<ModuleResult, ModuleError> {
    let exists_output = session.execute(&probes::file_exists_cmd(dest)).await?;

    if probes::parse_file_exists(&exists_output)? {
        let sha_output = session.execute(&probes::sha256_cmd(dest)).await?;
        let remote_digest = probes::parse_sha256(&sha_output)?;

        let stat_output = session.execute(&probes::stat_cmd(dest)).await?;
        let attrs = probes::parse_stat(&stat_output)?;

        // Overwrite only when content or any metadata attribute differs.
        let matches = remote_digest == digest
            && attrs.owner == owner
            && attrs.group == group
            && mode_bits(&attrs.mode) == mode_bits(mode);

        if matches {
            return Ok(ModuleResult::unchanged(format!(
                "{dest} already matches desired content and metadata"
            )));
        }
    }

    install_staged(session, staging, dest, digest, owner, group, mode).await
}

async fn install_staged(
    session: &mut dyn Session,
    staging: &str,
    dest: &str,
    digest: &str,
    owner: &str,
    group: &str,
    mode: &str,
) -> Result<ModuleResult, ModuleError> {
    let install_cmd = format!(
        "cp {staged} {dest} && chown {owner} {dest} && chgrp {group} {dest} && chmod {mode} {dest}",
        staged = shell_words::quote(staging),
        dest = shell_words::quote(dest),
        owner = shell_words::quote(owner),
        group = shell_words::quote(group),
        mode = shell_words::quote(mode),
    );

    debug!("installing {} on {}", dest, session.host());
    let output = session.execute(&install_cmd).await?;
    if !output.success() {
        return Ok(ModuleResult::failed(format!(
            "failed to install {}: {}",
            dest,
            output.stderr_text()
        )));
    }

    // Verify what actually landed.
    let verify_output = session.execute(&probes::sha256_cmd(dest)).await?;
    let written_digest = probes::parse_sha256(&verify_output)?;
    if written_digest == digest {
        Ok(ModuleResult::changed(format!("{dest} updated")))
    } else {
        Ok(ModuleResult::failed(format!(
            "{dest} content mismatch after write"
        )))
    }
}

async fn apply_absent(session: &mut dyn Session, dest: &str) -> Result<ModuleResult, ModuleError> {
    let exists_output = session.execute(&probes::file_exists_cmd(dest)).await?;
    if !probes::parse_file_exists(&exists_output)? {
        return Ok(ModuleResult::unchanged(format!("{dest} already absent")));
    }

    let output = session
        .execute(&format!("rm -f {}", shell_words::quote(dest)))
        .await?;

    let recheck = session.execute(&probes::file_exists_cmd(dest)).await?;
    if probes::parse_file_exists(&recheck)? {
        Ok(ModuleResult::failed(format!(
            "failed to remove {}: {}",
            dest,
            output.stderr_text()
        )))
    } else {
        Ok(ModuleResult::changed(format!("{dest} removed")))
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, ModuleError> {
    value.ok_or_else(|| ModuleError::InvalidConfig {
        module: "file",
        reason: format!("`{field}` is required for action `present`"),
    })
}

/// Octal permission comparison tolerates leading zeros ("0644" == "644").
fn mode_bits(mode: &str) -> Option<u32> {
    u32::from_str_radix(mode, 8).ok()
}

/// Unique remote staging path, keyed on the destination's file name.
fn staging_path(dest: &str) -> String {
    let name = Path::new(dest)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staged".to_string());

    format!("/tmp/{}-{}", name, Uuid::new_v4())
}

fn local_sha256(path: &Path) -> Result<String, ModuleError> {
    let content = std::fs::read(path).map_err(|e| ModuleError::LocalIo {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}
