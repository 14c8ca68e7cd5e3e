//! InMemoryViolationSink - keeps published violations in memory.
//!
//! Used by tests and by callers that want to inspect violations before
//! forwarding them somewhere else. Task names added with
//! [`InMemoryViolationSink::rejecting`] are refused, to exercise the
//! failure path of [`crate::app::publish_violations`].

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{SinkError, Violation};
use crate::ports::ViolationSink;

#[derive(Default)]
pub struct InMemoryViolationSink {
    published: Mutex<Vec<Violation>>,
    rejected_tasks: HashSet<String>,
}

impl InMemoryViolationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, task_name: impl Into<String>) -> Self {
        self.rejected_tasks.insert(task_name.into());
        self
    }

    /// Copy of everything accepted so far, in publish order.
    pub async fn published(&self) -> Vec<Violation> {
        self.published.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.published.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.published.lock().await.is_empty()
    }
}

#[async_trait]
impl ViolationSink for InMemoryViolationSink {
    async fn publish(&self, violation: &Violation) -> Result<(), SinkError> {
        if self.rejected_tasks.contains(&violation.task_name) {
            return Err(SinkError::Rejected(format!(
                "task '{}' is not accepted by this sink",
                violation.task_name
            )));
        }
        self.published.lock().await.push(violation.clone());
        Ok(())
    }
}
