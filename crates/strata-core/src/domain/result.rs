//! Stored outcome of one task invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::{TaskDescriptor, TaskKind};
use super::output::TaskOutput;

/// Lifecycle of a task within one run.
///
/// - Queued -> InProgress -> Done
/// - Queued -> InProgress -> Skipped (unmet dependency)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Done,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Skipped)
    }
}

/// Outcome of one task invocation.
///
/// Created by the stage runner right after the body returns (or fails), then
/// stored in the context. Never mutated after storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    /// Registry key; the report serializes it as the map key instead.
    #[serde(skip)]
    pub name: String,

    pub kind: TaskKind,
    pub status: TaskStatus,

    /// Set by the runner, never by the body.
    pub succeeded: bool,

    pub data: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub violation: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Log lines added while this task was running.
    pub logs: Vec<String>,

    /// Error lines added while this task was running.
    pub errors: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl TaskResult {
    fn base(
        descriptor: &TaskDescriptor,
        status: TaskStatus,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            status,
            succeeded: false,
            data: Value::Object(Map::new()),
            message: None,
            violation: false,
            error: None,
            logs: Vec::new(),
            errors: Vec::new(),
            started_at,
            finished_at,
            duration_ms,
        }
    }

    /// Successful invocation. The violation flag only survives for insights.
    pub(crate) fn success(
        descriptor: &TaskDescriptor,
        output: TaskOutput,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut result = Self::base(descriptor, TaskStatus::Done, started_at, finished_at);
        result.succeeded = true;
        result.data = output.data;
        result.message = output.message;
        result.violation = output.violation && descriptor.kind == TaskKind::Insight;
        result
    }

    pub(crate) fn failure(
        descriptor: &TaskDescriptor,
        error: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut result = Self::base(descriptor, TaskStatus::Done, started_at, finished_at);
        result.error = Some(error);
        result
    }

    pub(crate) fn skipped(
        descriptor: &TaskDescriptor,
        reason: String,
        at: DateTime<Utc>,
    ) -> Self {
        let mut result = Self::base(descriptor, TaskStatus::Skipped, at, at);
        result.error = Some(reason);
        result
    }
}
