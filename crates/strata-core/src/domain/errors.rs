//! Error taxonomy.
//!
//! Only [`SetupError`] and registration-time errors ([`RegistryError`],
//! [`BuildError`]) abort anything. A [`TaskError`] is always recovered by the
//! stage runner and downgraded to a failed task result.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure raised from (or on behalf of) a single task body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("base value '{0}' is missing")]
    MissingBaseKey(String),

    #[error("task '{0}' has not run")]
    UpstreamNotFound(String),

    #[error("malformed task result: {0}")]
    MalformedResult(String),

    #[error("task timed out after {0:?}")]
    Timeout(Duration),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("invalid value for '{key}': {reason}")]
    Config { key: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    /// Free-form failure, the usual way for a task body to bail out.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(e: serde_json::Error) -> Self {
        Self::Failed(format!("json: {e}"))
    }
}

/// StageOne failure. Fatal to the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("missing required config key '{0}'")]
    MissingConfig(String),

    #[error("setup failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("task name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing tasks: {0:?}. These tasks were expected but not registered.")]
    MissingTasks(Vec<String>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Error from a [`crate::ports::ViolationSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode violation: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("violation rejected: {0}")]
    Rejected(String),
}

/// Loading a JSON document (manifest, control map) from disk or a string.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
}
