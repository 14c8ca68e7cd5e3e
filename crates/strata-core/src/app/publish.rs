//! Handing a finished report's violations to a [`ViolationSink`].
//!
//! Each violation is published independently: one rejected record does not
//! stop the rest.

use serde::Serialize;

use crate::domain::Report;
use crate::ports::ViolationSink;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub published: usize,
    /// `(task_name, error)` for each violation the sink refused.
    pub failures: Vec<(String, String)>,
}

impl PublishSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub async fn publish_violations(report: &Report, sink: &dyn ViolationSink) -> PublishSummary {
    let mut summary = PublishSummary::default();
    for violation in &report.violations {
        match sink.publish(violation).await {
            Ok(()) => summary.published += 1,
            Err(err) => {
                tracing::error!(
                    run_id = %report.run_id,
                    task = %violation.task_name,
                    error = %err,
                    "failed to publish violation"
                );
                summary.failures.push((violation.task_name.clone(), err.to_string()));
            }
        }
    }
    tracing::info!(
        run_id = %report.run_id,
        published = summary.published,
        failed = summary.failures.len(),
        "violations published"
    );
    summary
}
