//! Remote probe commands and their output parsing
//!
//! Modules never build raw inspection commands themselves: the full
//! vocabulary of remote probes lives here, with shell quoting and output
//! parsing in one place so the parsers can be tested against captured
//! command output.

use crate::modules::error::ModuleError;
use crate::transport::CommandOutput;

/// Owner, group, and permission bits of a remote file as reported by stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttrs {
    pub owner: String,
    pub group: String,
    pub mode: String,
}

pub fn file_exists_cmd(path: &str) -> String {
    format!(
        "test -f {} && echo present || echo absent",
        shell_words::quote(path)
    )
}

pub fn parse_file_exists(output: &CommandOutput) -> Result<bool, ModuleError> {
    match output.first_line() {
        "present" => Ok(true),
        "absent" => Ok(false),
        other => Err(ModuleError::Probe {
            probe: "file-exists",
            output: other.to_string(),
        }),
    }
}

pub fn stat_cmd(path: &str) -> String {
    format!("stat -c '%U %G %a' {}", shell_words::quote(path))
}

pub fn parse_stat(output: &CommandOutput) -> Result<FileAttrs, ModuleError> {
    let line = output.first_line();
    let mut fields = line.split_whitespace();

    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(owner), Some(group), Some(mode), None) => Ok(FileAttrs {
            owner: owner.to_string(),
            group: group.to_string(),
            mode: mode.to_string(),
        }),
        _ => Err(ModuleError::Probe {
            probe: "stat",
            output: line.to_string(),
        }),
    }
}

pub fn sha256_cmd(path: &str) -> String {
    format!("sha256sum {}", shell_words::quote(path))
}

pub fn parse_sha256(output: &CommandOutput) -> Result<String, ModuleError> {
    let line = output.first_line();
    let digest = line.split_whitespace().next().unwrap_or("");

    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(digest.to_ascii_lowercase())
    } else {
        Err(ModuleError::Probe {
            probe: "sha256",
            output: line.to_string(),
        })
    }
}

pub fn package_installed_cmd(package: &str) -> String {
    format!(
        "dpkg-query -W -f='${{Status}}' {} 2>/dev/null | grep -c \"ok installed\"",
        shell_words::quote(package)
    )
}

pub fn parse_package_installed(output: &CommandOutput) -> Result<bool, ModuleError> {
    match output.first_line() {
        "1" => Ok(true),
        // grep -c prints 0 when the status line is missing entirely
        "0" | "" => Ok(false),
        other => Err(ModuleError::Probe {
            probe: "package-installed",
            output: other.to_string(),
        }),
    }
}

pub fn service_status_cmd(service: &str) -> String {
    format!("service {} status", shell_words::quote(service))
}

pub fn parse_service_running(service: &str, output: &CommandOutput) -> bool {
    let text = output.stdout.join("\n");
    text.contains(&format!("{service} is running"))
}
