//! Domain model (descriptors, outputs, results, reports, errors).
//!
//! Nothing here knows about stages or how tasks are invoked; it only
//! defines the shapes the engine records and hands back to callers.

pub mod controls;
pub mod descriptor;
pub mod errors;
pub mod ids;
pub mod manifest;
pub mod output;
pub mod report;
pub mod result;

pub use controls::{ControlMap, ControlReference};
pub use descriptor::{Severity, TaskDescriptor, TaskKind};
pub use errors::{BuildError, LoadError, RegistryError, SetupError, SinkError, TaskError};
pub use ids::RunId;
pub use manifest::{IntegrationDescriptor, IntegrationManifest};
pub use output::TaskOutput;
pub use report::{OverallStatus, Report, TaskResults, Violation};
pub use result::{TaskResult, TaskStatus};

/// Values produced once by StageOne, immutable for the rest of the run.
pub type BaseValues = serde_json::Map<String, serde_json::Value>;
