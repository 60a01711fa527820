//! Package module - manages apt packages on the remote host

use tracing::debug;

use crate::manifest::PackageSpec;
use crate::modules::error::ModuleError;
use crate::modules::interface::ModuleResult;
use crate::modules::probes;
use crate::transport::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    Install,
    Remove,
}

#[derive(Debug)]
pub struct PackageModule {
    action: PackageAction,
    package: String,
}

impl PackageModule {
    pub fn from_spec(spec: &PackageSpec) -> Result<Self, ModuleError> {
        let action = match spec.action.as_str() {
            "install" => PackageAction::Install,
            "remove" => PackageAction::Remove,
            other => {
                return Err(ModuleError::InvalidConfig {
                    module: "package",
                    reason: format!(
                        "invalid action `{other}`, valid actions are `install` and `remove`"
                    ),
                })
            }
        };

        if spec.package.trim().is_empty() {
            return Err(ModuleError::InvalidConfig {
                module: "package",
                reason: "package name must not be empty".to_string(),
            });
        }

        Ok(Self {
            action,
            package: spec.package.clone(),
        })
    }

    /// Query the remote package database for installed status.
    pub async fn installed(&self, session: &mut dyn Session) -> Result<bool, ModuleError> {
        let output = session
            .execute(&probes::package_installed_cmd(&self.package))
            .await?;
        probes::parse_package_installed(&output)
    }

    pub async fn apply(&self, session: &mut dyn Session) -> Result<ModuleResult, ModuleError> {
        let installed = self.installed(session).await?;

        match (self.action, installed) {
            (PackageAction::Install, true) => Ok(ModuleResult::unchanged(format!(
                "package {} is already installed",
                self.package
            ))),
            (PackageAction::Remove, false) => Ok(ModuleResult::unchanged(format!(
                "package {} is already absent",
                self.package
            ))),
            (PackageAction::Install, false) => {
                debug!("installing package {}", self.package);
                let output = session
                    .execute(&format!(
                        "apt-get install -y {}",
                        shell_words::quote(&self.package)
                    ))
                    .await?;

                // Classification rides on the re-check, not the exit status.
                if self.installed(session).await? {
                    Ok(ModuleResult::changed(format!(
                        "package {} installed",
                        self.package
                    )))
                } else {
                    Ok(ModuleResult::failed(format!(
                        "package {} still absent after install: {}",
                        self.package,
                        output.stderr_text()
                    )))
                }
            }
            (PackageAction::Remove, true) => {
                debug!("removing package {}", self.package);
                let output = session
                    .execute(&format!(
                        "apt-get remove -y {}",
                        shell_words::quote(&self.package)
                    ))
                    .await?;

                if self.installed(session).await? {
                    Ok(ModuleResult::failed(format!(
                        "package {} still installed after remove: {}",
                        self.package,
                        output.stderr_text()
                    )))
                } else {
                    Ok(ModuleResult::changed(format!(
                        "package {} removed",
                        self.package
                    )))
                }
            }
        }
    }
}
