//! Configuration.
//!
//! Two layers:
//! - [`Settings`]: process-level knobs read from the environment.
//! - [`JobConfig`]: per-run JSON object supplied by the caller, already
//!   validated against the integration's manifest schema.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::TaskError;

/// Restricts a run to the listed task names when non-empty.
pub const TASKS_KEY: &str = "tasks";
/// Per-job task timeout in seconds; overrides [`Settings::task_timeout`].
pub const TASK_TIMEOUT_KEY: &str = "task_timeout";
/// Carried into violation metadata.
pub const JOB_ID_KEY: &str = "job_id";
/// Written by the runner before StageOne starts.
pub const INTEGRATION_NAME_KEY: &str = "integration_name";

/// Read-only job configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfig(Map<String, Value>);

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Fails unless `value` is a JSON object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Builder-style insert, for assembling configs in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.0.get(key).cloned().unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Typed lookup. `Ok(None)` when the key is absent or null.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, TaskError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| TaskError::Config {
                    key: key.to_owned(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Names listed under `tasks`; non-string entries are ignored.
    pub fn requested_tasks(&self) -> Vec<String> {
        self.0
            .get(TASKS_KEY)
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `task_timeout` in seconds; `0`, a non-number or a value too large for
    /// a [`Duration`] means "not set".
    pub fn task_timeout(&self) -> Option<Duration> {
        self.0
            .get(TASK_TIMEOUT_KEY)
            .and_then(Value::as_f64)
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// `job_id`, accepted as a string or a number.
    pub fn job_id(&self) -> Option<String> {
        match self.0.get(JOB_ID_KEY)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,

    /// Record full error detail in engine logs on task failure.
    pub debug: bool,

    /// Upper bound for one task body; `None` lets a task run as long as it likes.
    pub task_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            debug: true,
            task_timeout: None,
        }
    }
}

impl Settings {
    /// `STRATA_LOG` (or `LOG_LEVEL`), `DEBUG`, `TASK_TIMEOUT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_filter = lookup("STRATA_LOG")
            .or_else(|| lookup("LOG_LEVEL").map(|level| level.to_lowercase()))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let debug = lookup("DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.debug);

        let task_timeout = lookup("TASK_TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            log_filter,
            debug,
            task_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn job_config_accessors() {
        let cfg = JobConfig::from_value(json!({
            "token": "t",
            "tasks": ["a", 1, "b"],
            "job_id": 42,
            "retries": 3,
        }))
        .unwrap();

        assert_eq!(cfg.get_str("token"), Some("t"));
        assert_eq!(cfg.get_or("missing", json!("d")), json!("d"));
        assert_eq!(cfg.requested_tasks(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cfg.job_id().as_deref(), Some("42"));
        assert_eq!(cfg.get_as::<u32>("retries").unwrap(), Some(3));
        assert_eq!(cfg.get_as::<u32>("missing").unwrap(), None);
        assert!(matches!(
            cfg.get_as::<u32>("token"),
            Err(TaskError::Config { key, .. }) if key == "token"
        ));
    }

    #[test]
    fn job_config_must_be_an_object() {
        assert!(JobConfig::from_value(json!([1, 2])).is_err());
    }

    #[rstest]
    #[case::unset(json!({}), None)]
    #[case::zero(json!({"task_timeout": 0}), None)]
    #[case::text(json!({"task_timeout": "soon"}), None)]
    #[case::seconds(json!({"task_timeout": 2}), Some(Duration::from_secs(2)))]
    #[case::fraction(json!({"task_timeout": 0.5}), Some(Duration::from_millis(500)))]
    #[case::huge(json!({"task_timeout": 1e20}), None)]
    #[case::negative(json!({"task_timeout": -3}), None)]
    fn task_timeout_from_job_config(#[case] value: Value, #[case] expected: Option<Duration>) {
        let cfg = JobConfig::from_value(value).unwrap();
        assert_eq!(cfg.task_timeout(), expected);
    }

    #[test]
    fn settings_defaults() {
        let s = Settings::from_lookup(lookup_from(&[]));
        assert_eq!(s, Settings::default());
        assert!(s.debug);
        assert_eq!(s.task_timeout, None);
    }

    #[test]
    fn settings_read_environment_names() {
        let s = Settings::from_lookup(lookup_from(&[
            ("LOG_LEVEL", "DEBUG"),
            ("DEBUG", "false"),
            ("TASK_TIMEOUT", "180"),
        ]));
        assert_eq!(s.log_filter, "debug");
        assert!(!s.debug);
        assert_eq!(s.task_timeout, Some(Duration::from_secs(180)));
    }

    #[test]
    fn strata_log_wins_over_log_level() {
        let s = Settings::from_lookup(lookup_from(&[
            ("STRATA_LOG", "strata_core=trace"),
            ("LOG_LEVEL", "WARN"),
        ]));
        assert_eq!(s.log_filter, "strata_core=trace");
    }

    #[rstest]
    #[case("0")]
    #[case("abc")]
    fn invalid_timeout_disables_it(#[case] raw: &str) {
        let s = Settings::from_lookup(lookup_from(&[("TASK_TIMEOUT", raw)]));
        assert_eq!(s.task_timeout, None);
    }
}
