//! Service module - restarts System V style services

use tracing::debug;

use crate::manifest::ServiceSpec;
use crate::modules::error::ModuleError;
use crate::modules::interface::ModuleResult;
use crate::modules::probes;
use crate::transport::Session;

#[derive(Debug)]
pub struct ServiceModule {
    service: String,
}

impl ServiceModule {
    pub fn from_spec(spec: &ServiceSpec) -> Result<Self, ModuleError> {
        if spec.action != "restart" {
            return Err(ModuleError::InvalidConfig {
                module: "service",
                reason: format!(
                    "invalid action `{}`, valid action is `restart`",
                    spec.action
                ),
            });
        }

        if spec.service.trim().is_empty() {
            return Err(ModuleError::InvalidConfig {
                module: "service",
                reason: "service name must not be empty".to_string(),
            });
        }

        Ok(Self {
            service: spec.service.clone(),
        })
    }

    pub async fn running(&self, session: &mut dyn Session) -> Result<bool, ModuleError> {
        let output = session
            .execute(&probes::service_status_cmd(&self.service))
            .await?;
        Ok(probes::parse_service_running(&self.service, &output))
    }

    /// Restart the service and verify it came back up.
    ///
    /// The named service must correspond to an installed package, otherwise
    /// no restart is attempted. A service that does not report running after
    /// the restart leaves the host in an inconsistent state and is fatal for
    /// the whole run, not just this task.
    pub async fn apply(&self, session: &mut dyn Session) -> Result<ModuleResult, ModuleError> {
        let installed_output = session
            .execute(&probes::package_installed_cmd(&self.service))
            .await?;

        if !probes::parse_package_installed(&installed_output)? {
            return Err(ModuleError::ServiceNotFound {
                service: self.service.clone(),
            });
        }

        debug!("restarting service {}", self.service);
        let restart_output = session
            .execute(&format!(
                "service {} restart",
                shell_words::quote(&self.service)
            ))
            .await?;

        if self.running(session).await? {
            Ok(ModuleResult::changed(format!(
                "service {} restarted",
                self.service
            )))
        } else {
            let stderr = restart_output.stderr_text();
            let reason = if stderr.is_empty() {
                "service did not report running after restart".to_string()
            } else {
                stderr
            };

            Err(ModuleError::ServiceRestartFailed {
                service: self.service.clone(),
                reason,
            })
        }
    }
}
