//! Final aggregated output of a pipeline run.
//!
//! The report is the only failure-reporting channel a caller gets: the run
//! itself never returns an error.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::controls::ControlReference;
use super::descriptor::{Severity, TaskDescriptor};
use super::ids::RunId;
use super::result::TaskResult;
use super::BaseValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Every task that ran succeeded.
    Completed,

    /// StageOne succeeded, at least one task failed or was skipped.
    CompletedWithErrors,

    /// StageOne failed; no task ran.
    Fatal,
}

/// A flagged insight outcome, ready for an external sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub task_name: String,
    pub title: String,
    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub data: Value,

    #[serde(default)]
    pub control_references: Vec<ControlReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    pub integration: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl Violation {
    pub(crate) fn from_result(
        descriptor: &TaskDescriptor,
        result: &TaskResult,
        control_references: Vec<ControlReference>,
        integration: &str,
        job_id: Option<String>,
    ) -> Self {
        let resource_id = result
            .data
            .get("resource_id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            task_name: result.name.clone(),
            title: descriptor.title.clone(),
            severity: descriptor.violation_severity(),
            message: result.message.clone(),
            data: result.data.clone(),
            control_references,
            resource_id,
            integration: integration.to_owned(),
            job_id,
            timestamp: result.finished_at,
        }
    }
}

/// Task results in execution order, serialized as an ordered `name -> result` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskResults(Vec<TaskResult>);

impl TaskResults {
    pub(crate) fn new(results: Vec<TaskResult>) -> Self {
        Self(results)
    }

    pub fn get(&self, name: &str) -> Option<&TaskResult> {
        self.0.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskResult> {
        self.0.iter()
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a TaskResults {
    type Item = &'a TaskResult;
    type IntoIter = std::slice::Iter<'a, TaskResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for TaskResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in &self.0 {
            map.serialize_entry(&result.name, result)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: RunId,
    pub integration: String,
    pub overall_status: OverallStatus,

    /// StageOne failure text when `overall_status` is fatal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,

    pub base: BaseValues,
    pub task_results: TaskResults,
    pub violations: Vec<Violation>,
    pub logs: Vec<String>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Report {
    /// Report for a run whose setup stage failed.
    pub(crate) fn fatal(
        run_id: RunId,
        integration: &str,
        error: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            integration: integration.to_owned(),
            overall_status: OverallStatus::Fatal,
            fatal_error: Some(error.clone()),
            base: BaseValues::new(),
            task_results: TaskResults::default(),
            violations: Vec::new(),
            logs: Vec::new(),
            errors: vec![error],
            started_at,
            finished_at,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.overall_status == OverallStatus::Fatal
    }
}
