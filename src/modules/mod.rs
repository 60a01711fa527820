//! Resource modules with idempotent check-then-apply semantics
//!
//! Each module validates its task parameters at construction, checks remote
//! state before mutating, and reports exactly one [`Outcome`] per run.

pub mod error;
mod file;
mod interface;
mod package;
pub mod probes;
mod service;

pub use error::ModuleError;
pub use file::FileModule;
pub use interface::{ModuleResult, Outcome};
pub use package::{PackageAction, PackageModule};
pub use service::ServiceModule;

use crate::manifest::{ModuleSpec, Task};
use crate::transport::Session;

/// Resolve a task to its module, run the check-and-apply cycle, and fold
/// non-fatal failures into [`Outcome::Failed`].
///
/// The only error that escapes is [`ModuleError::ServiceRestartFailed`],
/// which aborts the entire run.
pub async fn run_task(
    task: &Task,
    session: &mut dyn Session,
) -> Result<ModuleResult, ModuleError> {
    let result = match &task.module {
        ModuleSpec::Package(spec) => match PackageModule::from_spec(spec) {
            Ok(module) => module.apply(session).await,
            Err(e) => Err(e),
        },
        ModuleSpec::File(spec) => match FileModule::from_spec(spec) {
            Ok(module) => module.apply(session).await,
            Err(e) => Err(e),
        },
        ModuleSpec::Service(spec) => match ServiceModule::from_spec(spec) {
            Ok(module) => module.apply(session).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(result) => Ok(result),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(ModuleResult::failed(e.to_string())),
    }
}
