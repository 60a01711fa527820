//! Anvil - minimal configuration management agent
//!
//! Applies a declarative YAML manifest of package, file, and service tasks
//! to an ordered list of remote hosts over SSH, converging each resource
//! idempotently so repeated runs report no change.

pub mod config;
pub mod manifest;
pub mod modules;
pub mod runner;
pub mod transport;

pub use config::AgentConfig;
pub use manifest::{HostList, Manifest, ModuleSpec, Task};
pub use modules::{ModuleResult, Outcome};
pub use runner::{RunReport, TaskRunner};
