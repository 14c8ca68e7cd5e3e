//! TaskContext - the state every task body sees.
//!
//! One context per run, owned exclusively by that run. Tasks read base values,
//! job config and earlier results through it, and write log/error lines into it.
//! Execution is single-pass, so a task can only see results of tasks that ran
//! before it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::JobConfig;
use crate::domain::{BaseValues, TaskError, TaskResult, TaskStatus};
use crate::ports::Clock;

const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A log or error line, attributed to the task that was current when it was added.
#[derive(Debug, Clone)]
struct Line {
    task: Option<String>,
    text: String,
}

/// Pieces of a finished context, in the shape the report needs.
pub(crate) struct ContextParts {
    pub base: BaseValues,
    pub config: JobConfig,
    pub results: Vec<TaskResult>,
    pub logs: Vec<String>,
    pub errors: Vec<String>,
}

pub struct TaskContext {
    base: BaseValues,
    config: JobConfig,

    /// Append-only, execution order.
    results: Vec<TaskResult>,
    index: HashMap<String, usize>,

    logs: Vec<Line>,
    errors: Vec<Line>,

    current: Option<String>,
    clock: Arc<dyn Clock>,
}

impl TaskContext {
    /// Fresh context for one run; `base` is StageOne's output.
    pub fn new(base: BaseValues, config: JobConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            base,
            config,
            results: Vec::new(),
            index: HashMap::new(),
            logs: Vec::new(),
            errors: Vec::new(),
            current: None,
            clock,
        }
    }

    // ---------------------------------------------------------------------
    // Base values (StageOne output)
    // ---------------------------------------------------------------------

    /// Base value `key`.
    ///
    /// # Errors
    /// [`TaskError::MissingBaseKey`] if StageOne did not produce `key`.
    pub fn base(&self, key: &str) -> Result<&Value, TaskError> {
        self.base
            .get(key)
            .ok_or_else(|| TaskError::MissingBaseKey(key.to_owned()))
    }

    /// Base value `key`, or `default` when absent.
    pub fn base_or(&self, key: &str, default: Value) -> Value {
        self.base.get(key).cloned().unwrap_or(default)
    }

    /// Base value `key` deserialized into `T`.
    pub fn base_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, TaskError> {
        let value = self.base(key)?;
        serde_json::from_value(value.clone()).map_err(|e| TaskError::Config {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Every base value.
    pub fn base_values(&self) -> &BaseValues {
        &self.base
    }

    /// Job configuration of this run, read-only.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Upstream results
    // ---------------------------------------------------------------------

    /// Stored result of `task_name`, if it ran earlier in this run.
    pub fn result(&self, task_name: &str) -> Option<&TaskResult> {
        self.index.get(task_name).map(|&i| &self.results[i])
    }

    /// Whether `task_name` has a stored result (succeeded, failed or skipped).
    pub fn has_result(&self, task_name: &str) -> bool {
        self.index.contains_key(task_name)
    }

    /// `data` of an earlier task, or an empty mapping if it never ran.
    ///
    /// A failed task also yields an empty mapping; check [`Self::succeeded`]
    /// to tell "no data" from "crashed".
    pub fn get_data(&self, task_name: &str) -> Value {
        self.result(task_name)
            .map(|r| r.data.clone())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Strict variant of [`Self::get_data`].
    pub fn try_get_data(&self, task_name: &str) -> Result<&Value, TaskError> {
        self.result(task_name)
            .map(|r| &r.data)
            .ok_or_else(|| TaskError::UpstreamNotFound(task_name.to_owned()))
    }

    /// `succeeded` flag of `task_name`; `false` if it never ran.
    pub fn succeeded(&self, task_name: &str) -> bool {
        self.result(task_name).is_some_and(|r| r.succeeded)
    }

    /// `message` of `task_name`, if it ran and set one.
    pub fn get_message(&self, task_name: &str) -> Option<&str> {
        self.result(task_name).and_then(|r| r.message.as_deref())
    }

    /// Lifecycle state of `task_name`; `Queued` when it has no record.
    pub fn status(&self, task_name: &str) -> TaskStatus {
        match self.result(task_name) {
            Some(r) => r.status,
            None if self.current.as_deref() == Some(task_name) => TaskStatus::InProgress,
            None => TaskStatus::Queued,
        }
    }

    /// Name of the task currently running.
    pub fn current_task(&self) -> Option<&str> {
        self.current.as_deref()
    }

    // ---------------------------------------------------------------------
    // Logs / errors
    // ---------------------------------------------------------------------

    /// Append a log line, prefixed with the current UTC time.
    pub fn add_log(&mut self, text: impl AsRef<str>) {
        let stamped = format!(
            "[{}] {}",
            self.clock.now().format(LOG_TIMESTAMP_FORMAT),
            text.as_ref()
        );
        self.logs.push(Line {
            task: self.current.clone(),
            text: stamped,
        });
    }

    /// Append an error line. Recording an error does not fail the task.
    pub fn add_error(&mut self, text: impl Into<String>) {
        self.errors.push(Line {
            task: self.current.clone(),
            text: text.into(),
        });
    }

    /// Run-scoped log lines so far, in order.
    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.logs.iter().map(|l| l.text.as_str())
    }

    /// Run-scoped error lines so far, in order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|l| l.text.as_str())
    }

    // ---------------------------------------------------------------------
    // Runner-only
    // ---------------------------------------------------------------------

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn begin(&mut self, task_name: &str) {
        self.current = Some(task_name.to_owned());
    }

    /// Store a finished result, attaching the lines the task produced.
    ///
    /// A name is recorded at most once per run; a second record is dropped.
    pub(crate) fn record(&mut self, mut result: TaskResult) {
        if self.index.contains_key(&result.name) {
            tracing::warn!(task = %result.name, "result already recorded, ignoring");
            return;
        }
        result.logs = attributed(&self.logs, &result.name);
        result.errors = attributed(&self.errors, &result.name);

        self.index.insert(result.name.clone(), self.results.len());
        self.results.push(result);
        self.current = None;
    }

    pub(crate) fn into_parts(self) -> ContextParts {
        ContextParts {
            base: self.base,
            config: self.config,
            results: self.results,
            logs: self.logs.into_iter().map(|l| l.text).collect(),
            errors: self.errors.into_iter().map(|l| l.text).collect(),
        }
    }
}

fn attributed(lines: &[Line], task_name: &str) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.task.as_deref() == Some(task_name))
        .map(|l| l.text.clone())
        .collect()
}
