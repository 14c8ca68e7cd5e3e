//! StageTwo - the task-execution phase.
//!
//! # Flow
//! 1. collectors, in `(order, name)` order
//! 2. insights, same ordering, always run even if collectors failed
//!
//! Per task: check dependencies -> invoke body -> validate output -> record.
//! One task body runs to completion before the next begins. Any failure is
//! caught and recorded on that task; nothing a task does can abort the phase.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::Instrument;

use crate::context::TaskContext;
use crate::domain::{TaskError, TaskKind, TaskOutput, TaskResult};
use crate::tasks::{TaskDefinition, TaskRegistry};

pub struct StageTwo {
    registry: Arc<TaskRegistry>,
    timeout: Option<Duration>,
    debug: bool,
}

impl StageTwo {
    /// Stage over `registry` with no timeout and debug logging on.
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
            debug: true,
        }
    }

    /// Bound each body's run time.
    ///
    /// An async body is cancelled at its next await point once the bound
    /// passes. A body that blocks the thread cannot be interrupted: it runs to
    /// completion and is then failed with [`TaskError::Timeout`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Log full error detail (`{:?}`) on task failure instead of one line.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Tasks this stage would run for `requested` (empty = all), in order.
    pub fn plan(&self, requested: &[String]) -> Vec<&TaskDefinition> {
        TaskKind::PHASES
            .iter()
            .flat_map(|&kind| self.registry.list(kind))
            .filter(|d| requested.is_empty() || requested.iter().any(|r| r == d.name()))
            .collect()
    }

    /// Run every planned task once, collectors first, recording each result
    /// in `ctx`. Never fails: task failures end up in the recorded results.
    pub async fn start(&self, ctx: &mut TaskContext) {
        let requested = ctx.config().requested_tasks();
        if !requested.is_empty() {
            tracing::info!(?requested, "running requested tasks only");
        }

        for definition in self.plan(&requested) {
            let descriptor = &definition.descriptor;
            let span = tracing::info_span!("task", task = %descriptor.name, kind = %descriptor.kind);
            self.execute(definition, ctx).instrument(span).await;
        }
    }

    async fn execute(&self, definition: &TaskDefinition, ctx: &mut TaskContext) {
        let descriptor = &definition.descriptor;
        ctx.begin(&descriptor.name);

        if let Some(reason) = unmet_dependency(&descriptor.depends_on, ctx) {
            tracing::warn!(%reason, "skipping task");
            ctx.add_error(reason.clone());
            let at = ctx.now();
            ctx.record(TaskResult::skipped(descriptor, reason, at));
            return;
        }

        tracing::info!("executing task");
        let started_at = ctx.now();
        let outcome = self.invoke(definition, ctx).await;
        let finished_at = ctx.now();

        match outcome {
            Ok(output) => {
                if output.violation {
                    match descriptor.kind {
                        TaskKind::Insight => {
                            tracing::info!(severity = %descriptor.violation_severity(), "violation flagged")
                        }
                        TaskKind::Collector => {
                            tracing::warn!("collector returned violation=true, ignoring")
                        }
                    }
                }
                tracing::info!(succeeded = true, "task finished");
                ctx.record(TaskResult::success(descriptor, output, started_at, finished_at));
            }
            Err(err) => {
                if self.debug {
                    tracing::error!(error = ?err, "task failed");
                } else {
                    tracing::error!(error = %err, "task failed");
                }
                let message = err.to_string();
                ctx.add_error(message.clone());
                ctx.record(TaskResult::failure(descriptor, message, started_at, finished_at));
            }
        }
    }

    /// Run the body, turning panics, timeouts and malformed output into errors.
    async fn invoke(
        &self,
        definition: &TaskDefinition,
        ctx: &mut TaskContext,
    ) -> Result<TaskOutput, TaskError> {
        let run = AssertUnwindSafe(definition.body.run(ctx)).catch_unwind();

        let caught = match self.timeout {
            Some(limit) => {
                let started = Instant::now();
                let caught = match tokio::time::timeout(limit, run).await {
                    Ok(caught) => caught,
                    Err(_) => return Err(TaskError::Timeout(limit)),
                };
                // A blocking body finishes inside its first poll, before the
                // timer is ever checked.
                if started.elapsed() > limit {
                    return Err(TaskError::Timeout(limit));
                }
                caught
            }
            None => run.await,
        };

        let output = caught.unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&*payload))))?;
        output.validate()?;
        Ok(output)
    }
}

/// First dependency that did not run, or ran and failed.
fn unmet_dependency(depends_on: &[String], ctx: &TaskContext) -> Option<String> {
    depends_on.iter().find_map(|dep| {
        if !ctx.has_result(dep) {
            Some(format!("dependency '{dep}' was not executed"))
        } else if !ctx.succeeded(dep) {
            Some(format!("dependency '{dep}' failed"))
        } else {
            None
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
