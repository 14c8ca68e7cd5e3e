//! strata-core
//!
//! A staged task-execution engine. An integration registers collectors and
//! insights; a [`Runner`] executes a setup stage, then every enabled collector,
//! then every enabled insight, against one shared [`TaskContext`], and hands
//! back a [`Report`].
//!
//! # Modules
//! - **domain**: descriptors, outputs, results, reports, errors
//! - **tasks**: task bodies, definitions and the per-integration registry
//! - **context**: the state every task body sees
//! - **app**: StageOne, StageTwo, the Runner and its builder
//! - **ports**: clock, id generation, violation sink
//! - **impls**: in-process sinks
//! - **config**: process settings and job configuration
//! - **observability**: tracing setup and run summaries

pub mod app;
pub mod config;
pub mod context;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod tasks;

pub use app::{PublishSummary, Runner, RunnerBuilder, StageOne, publish_violations};
pub use config::{JobConfig, Settings};
pub use context::TaskContext;
pub use domain::{
    BaseValues, BuildError, ControlMap, IntegrationManifest, OverallStatus, RegistryError, Report,
    SetupError, Severity, TaskDescriptor, TaskError, TaskKind, TaskOutput, TaskResult, TaskStatus,
    Violation,
};
pub use tasks::{TaskBody, TaskDefinition, TaskRegistry};
