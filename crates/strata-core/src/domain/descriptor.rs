//! Task identity and scheduling metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which phase of StageTwo a task belongs to.
///
/// Collectors always run before insights; the derived `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Collector,
    Insight,
}

impl TaskKind {
    /// Phases in execution order.
    pub const PHASES: [TaskKind; 2] = [TaskKind::Collector, TaskKind::Insight];

    /// Order used when a descriptor does not set one.
    pub fn default_order(self) -> i32 {
        match self {
            TaskKind::Collector => 100,
            TaskKind::Insight => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Collector => "collector",
            TaskKind::Insight => "insight",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity carried by insights into violation records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and scheduling metadata for one task.
///
/// `name` is the registry key. Tasks of one kind run in ascending
/// `(order, name)`; the name tie-break keeps runs reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub kind: TaskKind,

    /// Only meaningful for insights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    pub order: i32,
    pub enabled: bool,

    /// Tasks that must have run successfully earlier in the same run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl TaskDescriptor {
    fn new(kind: TaskKind, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            kind,
            severity: None,
            order: kind.default_order(),
            enabled: true,
            depends_on: Vec::new(),
        }
    }

    /// Enabled collector at the default order (100).
    pub fn collector(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(TaskKind::Collector, name, title)
    }

    /// Enabled insight at the default order (500).
    pub fn insight(name: impl Into<String>, title: impl Into<String>, severity: Severity) -> Self {
        Self::new(TaskKind::Insight, name, title).with_severity(severity)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lower runs first within a phase; ties break on name.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Keep the task registered but never run it.
    pub fn disabled(self) -> Self {
        self.with_enabled(false)
    }

    /// Skip this task unless `task_name` ran earlier and succeeded.
    /// Call repeatedly for several dependencies; they are checked in order.
    pub fn depends_on(mut self, task_name: impl Into<String>) -> Self {
        self.depends_on.push(task_name.into());
        self
    }

    /// Sort key within one phase.
    pub fn sort_key(&self) -> (i32, &str) {
        (self.order, self.name.as_str())
    }

    /// Severity reported on a violation; insights declared without one are `medium`.
    pub fn violation_severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::collector(TaskDescriptor::collector("c", "C"), 100)]
    #[case::insight(TaskDescriptor::insight("i", "I", Severity::Low), 500)]
    fn default_order_depends_on_kind(#[case] descriptor: TaskDescriptor, #[case] order: i32) {
        assert_eq!(descriptor.order, order);
        assert!(descriptor.enabled);
    }

    #[test]
    fn sort_key_breaks_ties_by_name() {
        let a = TaskDescriptor::collector("a", "A");
        let b = TaskDescriptor::collector("b", "B");
        let early = TaskDescriptor::collector("z", "Z").with_order(10);
        assert!(a.sort_key() < b.sort_key());
        assert!(early.sort_key() < a.sort_key());
    }

    #[test]
    fn severity_defaults_to_medium() {
        let d = TaskDescriptor::collector("c", "C");
        assert_eq!(d.violation_severity(), Severity::Medium);
        let d = TaskDescriptor::insight("i", "I", Severity::Critical);
        assert_eq!(d.violation_severity(), Severity::Critical);
    }

    #[test]
    fn kinds_and_severities_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&TaskKind::Insight).unwrap(), "\"insight\"");
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert!(TaskKind::Collector < TaskKind::Insight);
    }
}
