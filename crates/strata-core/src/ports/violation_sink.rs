//! ViolationSink port - where flagged insights go after a run.
//!
//! The runner never calls a sink. Callers hand a finished report to
//! [`crate::app::publish_violations`] with whatever sink they wired up
//! (a remote API client, a file, an in-memory buffer for tests).

use async_trait::async_trait;

use crate::domain::{SinkError, Violation};

#[async_trait]
pub trait ViolationSink: Send + Sync {
    async fn publish(&self, violation: &Violation) -> Result<(), SinkError>;
}
