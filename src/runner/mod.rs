//! Sequential task runner
//!
//! One host at a time, one task at a time. A connection failure skips that
//! host; the service-restart fatal condition halts the whole run. The
//! session for each host is closed exactly once on every exit path.

mod report;

pub use report::{RunReport, RunSummary, TaskRecord, UnreachableHost};

use tracing::{debug, error, info, warn};

use crate::manifest::{HostList, Manifest};
use crate::modules::{self, ModuleError, ModuleResult};
use crate::transport::{Connector, Session};

pub struct TaskRunner {
    manifest: Manifest,
    hosts: HostList,
}

impl TaskRunner {
    pub fn new(manifest: Manifest, hosts: HostList) -> Self {
        Self { manifest, hosts }
    }

    /// Apply the manifest to every host in order and aggregate the report.
    pub async fn run(&self, connector: &dyn Connector) -> RunReport {
        let mut report = RunReport::new();

        for host in &self.hosts.hosts {
            info!("connecting to {}", host);

            let mut session = match connector.connect(host).await {
                Ok(session) => session,
                Err(e) => {
                    warn!("skipping host {}: {}", host, e);
                    report.record_unreachable(host, e.to_string());
                    continue;
                }
            };

            let host_result = self.run_host(session.as_mut(), host, &mut report).await;
            session.close().await;

            if let Err(fatal) = host_result {
                error!("halting run: {}", fatal);
                report.set_fatal(fatal.to_string());
                break;
            }
        }

        report.finish();
        report
    }

    async fn run_host(
        &self,
        session: &mut dyn Session,
        host: &str,
        report: &mut RunReport,
    ) -> Result<(), ModuleError> {
        for task in &self.manifest.tasks {
            info!("TASK [{} - {}]: {}", task.module.kind(), host, task.name);

            match modules::run_task(task, session).await {
                Ok(result) => {
                    debug!("task {} on {}: {}", task.name, host, result.outcome);
                    report.record(host, &task.name, result);
                }
                Err(fatal) => {
                    report.record(host, &task.name, ModuleResult::failed(fatal.to_string()));
                    return Err(fatal);
                }
            }
        }

        Ok(())
    }
}
